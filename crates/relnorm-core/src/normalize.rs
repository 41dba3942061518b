use relnorm_model::Relation;

use crate::error::Result;
use crate::{fifth, first, fourth, second, third};

/// The normal-form stages as methods on [`Relation`].
///
/// Each stage mutates the receiver and returns the relations it split off.
pub trait Normalize {
    fn to_1nf(&mut self) -> Result<Vec<Relation>>;
    fn to_2nf(&mut self) -> Result<Vec<Relation>>;
    fn to_3nf(&mut self) -> Result<Vec<Relation>>;
    fn to_bcnf(&mut self) -> Result<Vec<Relation>>;
    fn to_4nf(&mut self) -> Result<Vec<Relation>>;
    fn to_5nf(&mut self) -> Result<Vec<Relation>>;
}

impl Normalize for Relation {
    fn to_1nf(&mut self) -> Result<Vec<Relation>> {
        first::to_1nf(self)
    }

    fn to_2nf(&mut self) -> Result<Vec<Relation>> {
        second::to_2nf(self)
    }

    fn to_3nf(&mut self) -> Result<Vec<Relation>> {
        third::to_3nf(self)
    }

    fn to_bcnf(&mut self) -> Result<Vec<Relation>> {
        third::to_bcnf(self)
    }

    fn to_4nf(&mut self) -> Result<Vec<Relation>> {
        fourth::to_4nf(self)
    }

    fn to_5nf(&mut self) -> Result<Vec<Relation>> {
        fifth::to_5nf(self)
    }
}
