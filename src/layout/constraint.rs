//! Declarative constraint model
//!
//! A constraint relates one attribute of a target panel to an attribute of a
//! source panel (or of the container itself, or to a bare constant):
//!
//! ```text
//! target.attribute RELATION source.attribute * multiplier + constant
//! ```
//!
//! Without a source the bound is `constant * multiplier`.
//!
//! Enum-like fields accept any letter case when parsed from text, so
//! `"XEND"`, `"xend"` and `"XEnd"` all name [`Attribute::XEnd`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DeclarationError;

/// Name of the pseudo-panel standing for the container itself
pub const CONTAINER: &str = "super";

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Constrainable panel attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Attribute {
    Width,
    Height,
    XStart,
    YStart,
    /// `xstart + width`
    XEnd,
    /// `ystart + height`
    YEnd,
}

impl Attribute {
    pub fn keyword(self) -> &'static str {
        match self {
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::XStart => "xstart",
            Attribute::YStart => "ystart",
            Attribute::XEnd => "xend",
            Attribute::YEnd => "yend",
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Attribute::Width | Attribute::XStart | Attribute::XEnd => Axis::X,
            Attribute::Height | Attribute::YStart | Attribute::YEnd => Axis::Y,
        }
    }

    /// Whether the attribute is a pure extent (width or height)
    pub fn is_size(self) -> bool {
        matches!(self, Attribute::Width | Attribute::Height)
    }
}

impl FromStr for Attribute {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WIDTH" => Ok(Attribute::Width),
            "HEIGHT" => Ok(Attribute::Height),
            "XSTART" => Ok(Attribute::XStart),
            "YSTART" => Ok(Attribute::YStart),
            "XEND" => Ok(Attribute::XEnd),
            "YEND" => Ok(Attribute::YEnd),
            _ => Err(DeclarationError::UnknownAttribute(s.to_string())),
        }
    }
}

impl TryFrom<String> for Attribute {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Attribute> for String {
    fn from(value: Attribute) -> Self {
        value.keyword().to_string()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Relation between the two sides of a constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Relation {
    #[default]
    Eq,
    Ge,
    Le,
}

impl Relation {
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Eq => "eq",
            Relation::Ge => "ge",
            Relation::Le => "le",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ge => ">=",
            Relation::Le => "<=",
        }
    }

    pub(crate) fn operator(self) -> kasuari::RelationalOperator {
        match self {
            Relation::Eq => kasuari::RelationalOperator::Equal,
            Relation::Ge => kasuari::RelationalOperator::GreaterOrEqual,
            Relation::Le => kasuari::RelationalOperator::LessOrEqual,
        }
    }
}

impl FromStr for Relation {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EQ" => Ok(Relation::Eq),
            "GE" => Ok(Relation::Ge),
            "LE" => Ok(Relation::Le),
            _ => Err(DeclarationError::UnknownRelation(s.to_string())),
        }
    }
}

impl TryFrom<String> for Relation {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Relation> for String {
    fn from(value: Relation) -> Self {
        value.keyword().to_string()
    }
}

/// Constraint priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strength {
    Weak,
    #[default]
    Medium,
    Strong,
    /// Must hold, otherwise the layout is unresolvable
    Required,
}

impl Strength {
    pub fn keyword(self) -> &'static str {
        match self {
            Strength::Weak => "weak",
            Strength::Medium => "medium",
            Strength::Strong => "strong",
            Strength::Required => "required",
        }
    }

    pub(crate) fn to_kasuari(self) -> kasuari::Strength {
        match self {
            Strength::Weak => kasuari::Strength::WEAK,
            Strength::Medium => kasuari::Strength::MEDIUM,
            Strength::Strong => kasuari::Strength::STRONG,
            Strength::Required => kasuari::Strength::REQUIRED,
        }
    }
}

impl FromStr for Strength {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WEAK" => Ok(Strength::Weak),
            "MEDIUM" => Ok(Strength::Medium),
            "STRONG" => Ok(Strength::Strong),
            "REQUIRED" => Ok(Strength::Required),
            _ => Err(DeclarationError::UnknownStrength(s.to_string())),
        }
    }
}

impl TryFrom<String> for Strength {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strength> for String {
    fn from(value: Strength) -> Self {
        value.keyword().to_string()
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

fn default_multiplier() -> f64 {
    1.0
}

fn is_default_multiplier(value: &f64) -> bool {
    *value == 1.0
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// A user-declared linear relation between panel attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub target: String,
    /// Source panel, [`CONTAINER`], or empty for a constant bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub target_attribute: Attribute,
    /// Defaults to the target attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attribute: Option<Attribute>,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub constant: f64,
    #[serde(default = "default_multiplier", skip_serializing_if = "is_default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub strength: Strength,
}

impl Constraint {
    /// Create a constant bound `target.attribute RELATION 0` at medium strength
    pub fn new(target: impl Into<String>, attribute: Attribute, relation: Relation) -> Self {
        Self {
            target: target.into(),
            source: None,
            target_attribute: attribute,
            source_attribute: None,
            relation,
            constant: 0.0,
            multiplier: 1.0,
            strength: Strength::Medium,
        }
    }

    /// Relate to an attribute of another panel (or [`CONTAINER`])
    pub fn with_source(mut self, source: impl Into<String>, attribute: Attribute) -> Self {
        self.source = Some(source.into());
        self.source_attribute = Some(attribute);
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// The source panel name, treating an empty string as no source
    pub fn source_panel(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    /// The effective source attribute
    pub fn source_attribute(&self) -> Attribute {
        self.source_attribute.unwrap_or(self.target_attribute)
    }
}

/// Renders the constraint in the rules language, e.g.
/// `menu.width = super.width * 0.25 + 2 @strong`
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} ",
            self.target,
            self.target_attribute,
            self.relation.symbol()
        )?;
        match self.source_panel() {
            Some(source) => {
                write!(f, "{}.{}", source, self.source_attribute())?;
                if self.multiplier != 1.0 {
                    write!(f, " * {}", self.multiplier)?;
                }
                if self.constant > 0.0 {
                    write!(f, " + {}", self.constant)?;
                } else if self.constant < 0.0 {
                    write!(f, " - {}", -self.constant)?;
                }
            }
            None => write!(f, "{}", self.constant * self.multiplier)?,
        }
        if self.strength != Strength::Medium {
            write!(f, " @{}", self.strength)?;
        }
        Ok(())
    }
}
