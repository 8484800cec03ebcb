pub mod card;
pub mod city;
pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod deck;
pub mod engine;
pub mod error;
pub mod event;
pub mod map;
pub mod phase;
pub mod player;
pub mod snapshot;
pub mod state;


#[macro_use]
extern crate smallvec;
