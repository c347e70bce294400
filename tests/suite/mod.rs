mod invariants;
mod persistence;
mod scenarios;
