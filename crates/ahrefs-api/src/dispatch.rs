//! Resolution of `verb_noun` calls into builder commands.
//!
//! A call such as `where_gt("date", "2013-11-24")` is split at its first
//! underscore into a [`Verb`] (`where`) and a noun (`gt`). When schema
//! checking is enabled the pair must be registered in the schema's operation
//! table; the call is then turned into a [`Command`] the client applies.
//!
//! Bare `set`, `to`, `get`, `prepare` and `mode` take their noun from the
//! first argument, so `get("backlinks")` and `get_backlinks()` are the same
//! call. Bare `where`/`having` append a raw, pre-serialized condition.

use std::{fmt, str::FromStr};

use ahrefs_schema::Schema;

use crate::{
    error::{ApiError, Result},
    expr::{Clause, Filter},
    value::Value,
};

/// The first segment of a call name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Set,
    To,
    Get,
    Prepare,
    Mode,
    Select,
    Order,
    Where,
    Having,
    Params,
}

const VERBS: [(&str, Verb); 10] = [
    ("set", Verb::Set),
    ("to", Verb::To),
    ("get", Verb::Get),
    ("prepare", Verb::Prepare),
    ("mode", Verb::Mode),
    ("select", Verb::Select),
    ("order", Verb::Order),
    ("where", Verb::Where),
    ("having", Verb::Having),
    ("params", Verb::Params),
];

impl Verb {
    pub fn as_str(self) -> &'static str {
        VERBS
            .iter()
            .find(|(_, verb)| *verb == self)
            .map_or("", |(name, _)| *name)
    }

    /// Whether the bare form reads its noun from the first argument.
    fn noun_from_argument(self) -> bool {
        matches!(
            self,
            Verb::Set | Verb::To | Verb::Get | Verb::Prepare | Verb::Mode
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        VERBS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, verb)| *verb)
            .ok_or_else(|| ApiError::UnknownOperation(s.to_string()))
    }
}

/// A builder mutation or terminal action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a named query parameter.
    SetParam { name: String, value: Value },
    /// Set the response format.
    SetOutput(String),
    /// Validate and run the query against a table now.
    Fetch(String),
    /// Validate the query and stash it for the next batch run.
    Prepare(String),
    /// Set the target match mode.
    SetMode(String),
    Select(Vec<String>),
    OrderBy(Vec<String>),
    Where(Filter),
    Having(Filter),
    /// Append an unchecked condition string to a clause.
    RawCondition { clause: Clause, condition: String },
    /// Transport option (`post`, `withOriginalStats`) or unchecked parameter.
    RawParam { name: String, value: Value },
}

/// A parsed `verb[_noun](args...)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub verb: Verb,
    pub noun: Option<String>,
    pub args: Vec<Value>,
}

impl Call {
    pub fn new(verb: Verb, noun: Option<&str>, args: Vec<Value>) -> Self {
        Self {
            verb,
            noun: noun.map(str::to_string),
            args,
        }
    }

    /// Splits `method` at its first underscore.
    ///
    /// ```
    /// use ahrefs_api::dispatch::{Call, Verb};
    ///
    /// let call = Call::parse("get_backlinks_new_lost", vec![]).unwrap();
    /// assert_eq!(call.verb, Verb::Get);
    /// assert_eq!(call.noun.as_deref(), Some("backlinks_new_lost"));
    /// ```
    pub fn parse(method: &str, args: Vec<Value>) -> Result<Self> {
        let (verb, noun) = match method.split_once('_') {
            Some((verb, noun)) => (verb, Some(noun)),
            None => (method, None),
        };
        let verb = verb
            .parse::<Verb>()
            .map_err(|_| ApiError::UnknownOperation(method.to_string()))?;
        Ok(Self::new(verb, noun, args))
    }

    /// The call's name as the caller would have written it.
    pub fn method_name(&self) -> String {
        match &self.noun {
            Some(noun) => format!("{}_{}", self.verb, noun),
            None => self.verb.to_string(),
        }
    }

    /// Resolves the call, checking it against the operation table when a
    /// schema is given.
    pub fn resolve(mut self, schema: Option<&Schema>) -> Result<Command> {
        if self.noun.is_none() && self.verb.noun_from_argument() {
            let noun = self.string_arg(0)?;
            self.noun = Some(noun);
            self.args.remove(0);
        }

        if let (Some(schema), Some(noun)) = (schema, self.noun.as_deref()) {
            if !schema.is_operation(self.verb.as_str(), noun) {
                return Err(ApiError::UnknownFunction(self.method_name()));
            }
        }

        let noun = self.noun.clone().unwrap_or_default();
        let command = match self.verb {
            Verb::Set => {
                Command::SetParam {
                    name: noun,
                    value: self.arg(0)?.clone(),
                }
            }
            Verb::To => Command::SetOutput(noun),
            Verb::Get => Command::Fetch(noun),
            Verb::Prepare => Command::Prepare(noun),
            Verb::Mode => Command::SetMode(noun),
            Verb::Select => Command::Select(self.string_args()),
            Verb::Order => Command::OrderBy(self.string_args()),
            Verb::Where | Verb::Having => {
                let clause = if self.verb == Verb::Where {
                    Clause::Where
                } else {
                    Clause::Having
                };
                match self.noun.as_deref() {
                    Some(operator) => {
                        let filter = Filter {
                            operator: operator.to_string(),
                            column: self.string_arg(0)?,
                            value: self.arg(1)?.clone(),
                        };
                        match clause {
                            Clause::Where => Command::Where(filter),
                            Clause::Having => Command::Having(filter),
                        }
                    }
                    None => {
                        Command::RawCondition {
                            clause,
                            condition: self.string_arg(0)?,
                        }
                    }
                }
            }
            Verb::Params => {
                Command::RawParam {
                    name: self.string_arg(0)?,
                    value: self.arg(1)?.clone(),
                }
            }
        };
        Ok(command)
    }

    fn arg(&self, position: usize) -> Result<&Value> {
        self.args.get(position).ok_or_else(|| {
            ApiError::MissingArgument {
                call: self.method_name(),
                position,
            }
        })
    }

    fn string_arg(&self, position: usize) -> Result<String> {
        self.arg(position).map(Value::to_string)
    }

    fn string_args(&self) -> Vec<String> {
        self.args.iter().map(Value::to_string).collect()
    }
}
