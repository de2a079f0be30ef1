//! The interactive prompt loop.
//!
//! Modelled as a small state machine: a file is loaded, a chart kind chosen,
//! then a column list, after which the chart is rendered and the loop returns
//! to the chart-kind prompt with the dataset still loaded. `b` steps back one
//! stage, `q` at the file prompt (or end of input anywhere) quits.

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    core::{Result, utils::parse_column_list},
    dataset::{self, Dataset},
    plot::{ChartKind, ChartRequest, Plotter},
};

const QUIT: &str = "q";
const BACK: &str = "b";

/// Where the loop currently is.
#[derive(Debug)]
pub enum State {
    AwaitFile,
    AwaitKind {
        dataset: Dataset,
    },
    AwaitColumns {
        dataset: Dataset,
        kind: ChartKind,
    },
    Render {
        dataset: Dataset,
        request: ChartRequest,
    },
    Done,
}

/// Drives the prompt sequence over any input/output pair.
pub struct Session<'p, R, W> {
    plotter: &'p Plotter,
    input: R,
    output: W,
}

impl<'p, R: BufRead, W: Write> Session<'p, R, W> {
    pub fn new(plotter: &'p Plotter, input: R, output: W) -> Self {
        Self {
            plotter,
            input,
            output,
        }
    }

    /// Run until the user quits or input ends
    pub fn run(&mut self) -> Result<()> {
        let mut state = State::AwaitFile;
        while !matches!(state, State::Done) {
            state = self.step(state)?;
        }
        Ok(())
    }

    /// Advance the state machine by one prompt or one render
    pub fn step(&mut self, state: State) -> Result<State> {
        let next = match state {
            State::AwaitFile => {
                let Some(line) = self.prompt("Enter the path to the data file (or 'q' to quit): ")?
                else {
                    return Ok(State::Done);
                };
                if line.eq_ignore_ascii_case(QUIT) {
                    State::Done
                } else {
                    match dataset::load_csv(Path::new(&line)) {
                        Ok(dataset) => {
                            self.describe(&dataset)?;
                            State::AwaitKind { dataset }
                        }
                        Err(e) => {
                            writeln!(
                                self.output,
                                "Error: {e}. Please enter a valid file path or 'q' to quit."
                            )?;
                            State::AwaitFile
                        }
                    }
                }
            }

            State::AwaitKind { dataset } => {
                let question = format!(
                    "Enter the type of plot you want to generate ({}) or 'b' to go back: ",
                    ChartKind::valid_tags()
                );
                let Some(line) = self.prompt(&question)? else {
                    return Ok(State::Done);
                };
                if line.eq_ignore_ascii_case(BACK) {
                    State::AwaitFile
                } else {
                    match line.parse::<ChartKind>() {
                        Ok(kind) => State::AwaitColumns { dataset, kind },
                        Err(_) => {
                            writeln!(
                                self.output,
                                "Invalid plot type. Please enter one of {} or 'b' to go back.",
                                ChartKind::valid_tags()
                            )?;
                            State::AwaitKind { dataset }
                        }
                    }
                }
            }

            State::AwaitColumns { dataset, kind } => {
                let Some(line) = self.prompt(
                    "Enter the names of the columns to be plotted (separated by comma) or 'b' to go back: ",
                )?
                else {
                    return Ok(State::Done);
                };
                if line.eq_ignore_ascii_case(BACK) {
                    State::AwaitKind { dataset }
                } else {
                    let columns = parse_column_list(&line);
                    let unknown: Vec<&str> = columns
                        .iter()
                        .map(String::as_str)
                        .filter(|name| !dataset.has_column(name))
                        .collect();

                    if columns.is_empty() {
                        writeln!(self.output, "Error: no column names given")?;
                        State::AwaitColumns { dataset, kind }
                    } else if !unknown.is_empty() {
                        writeln!(
                            self.output,
                            "Error: invalid column names: {}",
                            unknown.join(", ")
                        )?;
                        State::AwaitColumns { dataset, kind }
                    } else {
                        State::Render {
                            request: ChartRequest::new(kind, columns),
                            dataset,
                        }
                    }
                }
            }

            State::Render { dataset, request } => {
                match self.plotter.plot(&dataset, &request) {
                    Ok(rendered) => {
                        if let Some(path) = &rendered.saved_to {
                            writeln!(self.output, "Saved {} plot to {}", request.kind, path.display())?;
                        }
                    }
                    Err(e) => writeln!(self.output, "Error: {e}")?,
                }
                State::AwaitKind { dataset }
            }

            State::Done => State::Done,
        };
        Ok(next)
    }

    /// Print `question` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn describe(&mut self, dataset: &Dataset) -> Result<()> {
        writeln!(
            self.output,
            "Loaded {} rows. Columns:",
            dataset.row_count()
        )?;
        for column in dataset.columns() {
            writeln!(self.output, "  {} ({})", column.name(), column.column_type())?;
        }
        Ok(())
    }
}
