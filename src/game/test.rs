//! Scenario tests for the game engine, one submodule per area of the rules.

#![cfg(test)]

mod government;
mod policy_deck_construction;
