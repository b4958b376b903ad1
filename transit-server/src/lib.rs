//! Transit journey planner server.
//!
//! A web application that answers: "I'm at this stop at this time,
//! how do I get to my destination?" Journeys are found with a
//! round-based search over an in-memory timetable and returned as the
//! Pareto-optimal set on arrival time, transfers and walking.

pub mod config;
pub mod display;
pub mod domain;
pub mod planner;
pub mod schedule;
pub mod web;
