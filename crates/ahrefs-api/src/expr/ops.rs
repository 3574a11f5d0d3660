//! Filter operators.

/// Comparison operators and their wire symbols.
///
/// `gt`/`gte` both serialize to `>=` and `lt`/`lte` both to `<=`; strict
/// comparisons have no wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Comparison {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Comparison::Eq),
            "ne" => Some(Comparison::Ne),
            "gt" => Some(Comparison::Gt),
            "lt" => Some(Comparison::Lt),
            "gte" => Some(Comparison::Gte),
            "lte" => Some(Comparison::Lte),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt | Comparison::Gte => ">=",
            Comparison::Lt | Comparison::Lte => "<=",
        }
    }
}

/// How a filter's operator name is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator<'a> {
    /// `column<op>value`
    Comparison(Comparison),
    /// `name(column,value)`
    Function(&'a str),
    /// A name shorter than four characters that is not a known comparison.
    Unknown(&'a str),
}

impl<'a> Operator<'a> {
    /// Classifies an operator by the length of its name, then by the name itself.
    pub fn parse(name: &'a str) -> Self {
        if name.len() < 4 {
            Comparison::from_name(name).map_or(Operator::Unknown(name), Operator::Comparison)
        } else {
            Operator::Function(name)
        }
    }
}
