//! Channel formulas and the variable vocabulary.
//!
//! Every formula is a pure arithmetic expression over a fixed, ordered
//! vocabulary of 18 named numeric inputs. The position of a name in
//! [`VOCABULARY`] is the sole binding contract between compilation and
//! evaluation: the value vector handed to every compiled formula is
//! assembled in exactly this order, every time.
//!
//! | name | meaning |
//! |------|---------|
//! | `x` `y` `p` | current raw position and pressure |
//! | `tx` `ty`   | current raw tilt |
//! | `d`         | current raw hover distance |
//! | `lx` `ly` `lp` | last raw position and pressure |
//! | `ltx` `lty` | last raw tilt |
//! | `ld`        | last raw hover distance |
//! | `mx` `my` `mp` | device maxima |
//! | `cx` `cy` `cp` | last computed position and pressure |

mod engine;

pub use engine::FormulaEngine;

use rhai::AST;

/// The fixed ordered variable vocabulary available to every formula.
pub const VOCABULARY: [&str; 18] = [
    "x", "y", "p", "tx", "ty", "d", "lx", "ly", "lp", "ltx", "lty", "ld", "mx", "my", "mp", "cx",
    "cy", "cp",
];

/// Number of vocabulary slots.
pub const VOCABULARY_LEN: usize = VOCABULARY.len();

/// A vocabulary slot, usable as an index into a value vector assembled in
/// vocabulary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Slot {
    X,
    Y,
    P,
    Tx,
    Ty,
    D,
    Lx,
    Ly,
    Lp,
    Ltx,
    Lty,
    Ld,
    Mx,
    My,
    Mp,
    Cx,
    Cy,
    Cp,
}

impl Slot {
    /// Index of this slot in [`VOCABULARY`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Vocabulary name of this slot.
    #[inline]
    pub const fn name(self) -> &'static str {
        VOCABULARY[self as usize]
    }
}

/// One of the five independently configurable output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
    Pressure,
    TiltX,
    TiltY,
}

impl Channel {
    /// All channels in evaluation order: X, Y, Pressure, then TiltX, TiltY.
    pub const ALL: [Channel; 5] = [
        Channel::X,
        Channel::Y,
        Channel::Pressure,
        Channel::TiltX,
        Channel::TiltY,
    ];

    /// Human-readable channel name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::X => "X",
            Channel::Y => "Y",
            Channel::Pressure => "Pressure",
            Channel::TiltX => "TiltX",
            Channel::TiltY => "TiltY",
        }
    }

    /// The trivial formula equal to the channel's own raw input variable,
    /// substituted when a user formula fails to compile.
    pub const fn identity_formula(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Pressure => "p",
            Channel::TiltX => "tx",
            Channel::TiltY => "ty",
        }
    }
}

/// A compiled channel formula: immutable, side-effect free, shared by all
/// evaluations until replaced by recompilation.
#[derive(Clone)]
pub struct CompiledFormula {
    /// The compiled expression AST.
    pub(crate) ast: AST,
    /// The formula source this was compiled from.
    source: String,
    /// The channel this formula was compiled for.
    channel: Channel,
}

impl CompiledFormula {
    pub(crate) fn new(ast: AST, source: &str, channel: Channel) -> Self {
        Self {
            ast,
            source: source.to_string(),
            channel,
        }
    }

    /// Get the source text of this formula.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the channel this formula belongs to.
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

impl std::fmt::Debug for CompiledFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFormula")
            .field("channel", &self.channel)
            .field("source", &self.source)
            .finish()
    }
}
