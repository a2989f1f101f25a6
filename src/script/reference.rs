//! Reference parser for suite-file expressions.

use pest::Parser;
use pest_derive::Parser;
use std::fmt;

use crate::errors::RegistrationError;

#[derive(Parser)]
#[grammar = "script/reference.pest"]
struct ReferenceParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Field(String),
    Index(usize),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => write!(f, "{}", name),
            Accessor::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A parsed `$name.field[0]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub root: String,
    pub accessors: Vec<Accessor>,
    text: String,
}

impl Reference {
    pub fn parse(text: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidReference {
            reference: text.to_string(),
            reason,
        };

        let mut pairs = ReferenceParser::parse(Rule::reference, text)
            .map_err(|e| invalid(e.variant.message().into_owned()))?;
        let reference = pairs
            .next()
            .ok_or_else(|| invalid("empty reference".to_string()))?;

        let mut inner = reference.into_inner();
        let root = inner
            .next()
            .filter(|pair| pair.as_rule() == Rule::ident)
            .ok_or_else(|| invalid("missing variable name".to_string()))?
            .as_str()
            .to_string();

        let mut accessors = Vec::new();
        for pair in inner {
            match pair.as_rule() {
                Rule::field => {
                    let name = pair.into_inner().as_str().to_string();
                    accessors.push(Accessor::Field(name));
                }
                Rule::element => {
                    let digits = pair.into_inner().as_str();
                    let index = digits
                        .parse::<usize>()
                        .map_err(|e| invalid(format!("index {}: {}", digits, e)))?;
                    accessors.push(Accessor::Index(index));
                }
                _ => {}
            }
        }

        Ok(Reference {
            root,
            accessors,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
