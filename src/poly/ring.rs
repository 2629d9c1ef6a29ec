use anyhow::Error;

use super::{parser, Coefficient, MonomialOrder, MultiPoly, Rational, RationalFunction};
use crate::errors::IdentError;

/// Ordered list of named variables together with the monomial order that
/// every polynomial built in this ring uses.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    names: Vec<String>,
    order: MonomialOrder,
}

impl Ring {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Ring {
            names: names.into_iter().map(Into::into).collect(),
            order: MonomialOrder::DegRevLex,
        }
    }

    pub fn with_order(mut self, order: MonomialOrder) -> Self {
        self.order = order;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_vars(&self) -> usize {
        self.names.len()
    }

    pub fn order(&self) -> MonomialOrder {
        self.order
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Generator number `index` of the ring.
    pub fn gen<C: Coefficient>(&self, index: usize) -> MultiPoly<C> {
        MultiPoly::var(index, self.order)
    }

    pub fn var<C: Coefficient>(&self, name: &str) -> Result<MultiPoly<C>, Error> {
        let index = self
            .index_of(name)
            .ok_or_else(|| IdentError::UnknownVariable(name.to_string()))?;
        Ok(self.gen(index))
    }

    pub fn constant<C: Coefficient>(&self, c: C) -> MultiPoly<C> {
        MultiPoly::constant(c).with_order(self.order)
    }

    /// This ring followed by `fresh` variables, using `order`.
    pub fn extend<S: AsRef<str>>(&self, fresh: &[S], order: MonomialOrder) -> Ring {
        let mut names = self.names.clone();
        names.extend(fresh.iter().map(|s| s.as_ref().to_string()));
        Ring { names, order }
    }

    /// Moves a polynomial of ring `from` into this ring by variable name.
    pub fn cast<C: Coefficient>(&self, poly: &MultiPoly<C>, from: &Ring) -> Result<MultiPoly<C>, Error> {
        for i in poly.variables() {
            let name = from
                .names
                .get(i)
                .ok_or(IdentError::DimensionMismatch {
                    expected: from.num_vars(),
                    found: i + 1,
                })?;
            if !self.contains(name) {
                return Err(IdentError::UnknownVariable(name.clone()).into());
            }
        }
        let mapped = poly.remap(
            |i| from.names.get(i).and_then(|name| self.index_of(name)),
            self.order,
        );
        // every used variable was checked above
        mapped.ok_or_else(|| IdentError::UnknownVariable(self.format(poly)).into())
    }

    pub fn cast_function(&self, f: &RationalFunction, from: &Ring) -> Result<RationalFunction, Error> {
        RationalFunction::new(self.cast(f.numerator(), from)?, self.cast(f.denominator(), from)?)
    }

    /// Names of the variables occurring in `poly`.
    pub fn variable_names<C: Coefficient>(&self, poly: &MultiPoly<C>) -> Vec<String> {
        poly.variables()
            .into_iter()
            .filter_map(|i| self.names.get(i).cloned())
            .collect()
    }

    pub fn format<C: Coefficient>(&self, poly: &MultiPoly<C>) -> String {
        poly.format_with(&self.names)
    }

    pub fn format_function(&self, f: &RationalFunction) -> String {
        if f.denominator().is_one() {
            self.format(f.numerator())
        } else {
            format!("({}) / ({})", self.format(f.numerator()), self.format(f.denominator()))
        }
    }

    /// Parses a rational expression over this ring.
    pub fn parse(&self, input: &str) -> Result<RationalFunction, Error> {
        parser::parse_rational_function(input, self)
    }

    /// Parses a polynomial expression over this ring.
    pub fn parse_poly(&self, input: &str) -> Result<MultiPoly<Rational>, Error> {
        let f = self.parse(input)?;
        match f.as_polynomial() {
            Some(p) => Ok(p),
            None => Err(IdentError::Parse {
                input: input.to_string(),
                reason: "expected a polynomial".to_string(),
            }
            .into()),
        }
    }
}
