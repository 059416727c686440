mod args;

pub use args::{Cli, ListArgs, OutputFormat, TagCommand, UpdateArgs};
