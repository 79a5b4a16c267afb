//! Test suites for the directory daemon.

mod support;
mod unit;
