//! Rhai-backed formula engine.
//!
//! Formulas are compiled with `compile_expression`, which restricts the
//! grammar to a single expression: no statements, no loops, no function
//! definitions. Combined with the engine operation limits this guarantees
//! every evaluation completes in bounded time.
//!
//! Rhai binds variables at evaluation time, so a parsed expression alone
//! does not prove its identifiers resolve. `compile` therefore
//! probe-evaluates the parsed AST once against a fully-populated vocabulary
//! scope; an unknown variable, unknown function, or non-numeric result is a
//! compile error, never a runtime one.
//!
//! Note that rhai spells exponentiation `**` (`^` is bitwise XOR).

use crate::error::{Result, ShaperError};
use crate::formula::{Channel, CompiledFormula, VOCABULARY, VOCABULARY_LEN};
use rhai::{Dynamic, Engine, Scope};

/// Expression engine shared by compilation and evaluation.
///
/// Compilation is deterministic and has no side effects. Evaluation is pure
/// with respect to the scope values and propagates IEEE-754 semantics for
/// NaN and infinity rather than failing.
pub struct FormulaEngine {
    engine: Engine,
}

impl FormulaEngine {
    /// Create a new engine with the math vocabulary registered and safety
    /// limits applied.
    pub fn new() -> Self {
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine);
        Self { engine }
    }

    /// Configure the Rhai engine with math functions and safety limits.
    fn configure_engine(engine: &mut Engine) {
        // Formulas are single expressions; these limits bound pathological
        // nesting and operation counts.
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(10_000);

        // ===== Mathematical Functions =====

        engine.register_fn("abs", |x: f64| x.abs());
        engine.register_fn("sqrt", |x: f64| x.sqrt());
        engine.register_fn("pow", |x: f64, y: f64| x.powf(y));
        engine.register_fn("exp", |x: f64| x.exp());
        engine.register_fn("ln", |x: f64| x.ln());
        engine.register_fn("log", |x: f64| x.ln()); // Alias for natural log
        engine.register_fn("log10", |x: f64| x.log10());
        engine.register_fn("log2", |x: f64| x.log2());
        engine.register_fn("sin", |x: f64| x.sin());
        engine.register_fn("cos", |x: f64| x.cos());
        engine.register_fn("tan", |x: f64| x.tan());
        engine.register_fn("asin", |x: f64| x.asin());
        engine.register_fn("acos", |x: f64| x.acos());
        engine.register_fn("atan", |x: f64| x.atan());
        engine.register_fn("atan2", |y: f64, x: f64| y.atan2(x));
        engine.register_fn("sinh", |x: f64| x.sinh());
        engine.register_fn("cosh", |x: f64| x.cosh());
        engine.register_fn("tanh", |x: f64| x.tanh());

        // Rounding functions
        engine.register_fn("floor", |x: f64| x.floor());
        engine.register_fn("ceil", |x: f64| x.ceil());
        engine.register_fn("round", |x: f64| x.round());
        engine.register_fn("trunc", |x: f64| x.trunc());
        engine.register_fn("fract", |x: f64| x.fract());

        // Clamping and limiting
        engine.register_fn("clamp", |x: f64, min: f64, max: f64| x.clamp(min, max));
        engine.register_fn("min", |a: f64, b: f64| a.min(b));
        engine.register_fn("max", |a: f64, b: f64| a.max(b));

        // Constants
        engine.register_fn("pi", || std::f64::consts::PI);
        engine.register_fn("e", || std::f64::consts::E);

        engine.register_fn("sign", |x: f64| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        });
    }

    /// Compile a formula for a channel.
    ///
    /// Fails when the source is not a well-formed arithmetic expression or
    /// when probe evaluation rejects it (unknown identifier, unknown
    /// function, non-numeric result). The returned artifact owns its own
    /// copy of the source and no reference to the input is retained.
    pub fn compile(&self, channel: Channel, source: &str) -> Result<CompiledFormula> {
        let ast = self
            .engine
            .compile_expression(source)
            .map_err(ShaperError::from_parse_error)?;

        let mut probe = Self::probe_scope();
        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut probe, &ast)
            .map_err(|e| {
                ShaperError::Formula(format!(
                    "{} formula '{}' does not evaluate: {}",
                    channel.name(),
                    source,
                    e
                ))
            })?;

        if value.as_float().is_err() && value.as_int().is_err() {
            return Err(ShaperError::Formula(format!(
                "{} formula '{}' must evaluate to a number, got {}",
                channel.name(),
                source,
                value.type_name()
            )));
        }

        Ok(CompiledFormula::new(ast, source, channel))
    }

    /// Evaluate a compiled formula against a vocabulary scope.
    ///
    /// NaN and infinity propagate as values. The only error source left
    /// after probe validation is the engine operation limit.
    pub fn eval(&self, formula: &CompiledFormula, scope: &mut Scope) -> Result<f64> {
        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(scope, &formula.ast)
            .map_err(ShaperError::from_eval_error)?;

        if let Ok(f) = value.as_float() {
            Ok(f)
        } else if let Ok(i) = value.as_int() {
            Ok(i as f64)
        } else {
            Err(ShaperError::Formula(format!(
                "{} formula returned {}",
                formula.channel().name(),
                value.type_name()
            )))
        }
    }

    /// Create an evaluation scope with every vocabulary name bound to zero,
    /// in vocabulary order. Reused across reports; values are overwritten
    /// in place.
    pub fn new_scope() -> Scope<'static> {
        let mut scope = Scope::new();
        for name in VOCABULARY {
            scope.push(name, 0.0_f64);
        }
        scope
    }

    /// Overwrite all vocabulary values in a scope assembled by
    /// [`FormulaEngine::new_scope`].
    pub fn bind(scope: &mut Scope, values: &[f64; VOCABULARY_LEN]) {
        for (name, value) in VOCABULARY.iter().zip(values.iter()) {
            scope.set_value(*name, *value);
        }
    }

    /// Scope of finite dummy values used for probe evaluation.
    fn probe_scope() -> Scope<'static> {
        let mut scope = Scope::new();
        for name in VOCABULARY {
            scope.push(name, 1.0_f64);
        }
        scope
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormulaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaEngine").finish()
    }
}
