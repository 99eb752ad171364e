use std::io::{self, Write};

use serde::Serialize;

use crate::fetch::DataSetRelation;
use crate::graph::ObjectGraph;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Pretty,
    Compact,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_graph(graph: &ObjectGraph, mode: OutputMode) -> io::Result<()> {
        Self::print_json(graph, mode)
    }

    pub fn print_relations(mode: OutputMode) -> io::Result<()> {
        let names = DataSetRelation::ALL
            .iter()
            .map(DataSetRelation::as_str)
            .collect::<Vec<_>>();
        Self::print_json(&names, mode)
    }

    fn print_json<T: Serialize>(value: &T, mode: OutputMode) -> io::Result<()> {
        let json = match mode {
            OutputMode::Pretty => serde_json::to_string_pretty(value),
            OutputMode::Compact => serde_json::to_string(value),
        }
        .map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
