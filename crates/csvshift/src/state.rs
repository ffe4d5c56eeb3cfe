use crate::emit::TargetFormat;
use crate::error::ConvertError;
use crate::model::{Artifact, ParsedTable, RawInput};
use crate::options::ConversionOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterState {
    Idle,
    Parsing,
    Ready,
    Converting,
    Done,
    Error(String),
}

impl ConverterState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Ready => "ready",
            Self::Converting => "converting",
            Self::Done => "done",
            Self::Error(_) => "error",
        }
    }

    pub fn transition(&self, event: ConverterEvent) -> Result<Self, ConvertError> {
        use ConverterEvent as E;
        use ConverterState as S;

        match (self, event) {
            (S::Idle | S::Ready | S::Done | S::Error(_), E::FileSelected) => Ok(S::Parsing),
            (S::Parsing, E::ParseSucceeded) => Ok(S::Ready),
            (S::Parsing, E::ParseFailed(message)) | (S::Converting, E::ConvertFailed(message)) => {
                Ok(S::Error(message))
            }
            (S::Ready | S::Done, E::ConvertClicked) => Ok(S::Converting),
            (S::Converting, E::ConvertSucceeded) => Ok(S::Done),
            (state, event) => Err(ConvertError::InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterEvent {
    FileSelected,
    ParseSucceeded,
    ParseFailed(String),
    ConvertClicked,
    ConvertSucceeded,
    ConvertFailed(String),
}

impl ConverterEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FileSelected => "file-selected",
            Self::ParseSucceeded => "parse-succeeded",
            Self::ParseFailed(_) => "parse-failed",
            Self::ConvertClicked => "convert-clicked",
            Self::ConvertSucceeded => "convert-succeeded",
            Self::ConvertFailed(_) => "convert-failed",
        }
    }
}

/// One converter page: a loaded table moving through the state machine.
#[derive(Debug, Clone)]
pub struct Converter {
    state: ConverterState,
    table: Option<ParsedTable>,
    options: ConversionOptions,
}

impl Converter {
    #[must_use]
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            state: ConverterState::Idle,
            table: None,
            options,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    #[must_use]
    pub fn table(&self) -> Option<&ParsedTable> {
        self.table.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    fn apply(&mut self, event: ConverterEvent) -> Result<(), ConvertError> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    /// Parses a `.csv` file, or recovers rows from a `.pdf`, replacing any
    /// previously loaded table.
    pub fn load(&mut self, raw: &RawInput) -> Result<&ParsedTable, ConvertError> {
        self.apply(ConverterEvent::FileSelected)?;
        self.table = None;

        let parsed = if raw.has_extension("pdf") {
            crate::extract_pdf(raw)
        } else {
            crate::parse_table(raw, &self.options)
        };

        match parsed {
            Ok(table) => {
                self.apply(ConverterEvent::ParseSucceeded)?;
                Ok(self.table.insert(table))
            }
            Err(error) => {
                self.apply(ConverterEvent::ParseFailed(error.to_string()))?;
                Err(error)
            }
        }
    }

    pub fn convert(&mut self, format: TargetFormat) -> Result<Artifact, ConvertError> {
        self.apply(ConverterEvent::ConvertClicked)?;
        let result = self.table.as_ref().map_or_else(
            || Err(ConvertError::Internal("no table loaded".to_string())),
            |table| crate::convert_table(table, format, &self.options),
        );

        match result {
            Ok(artifact) => {
                self.apply(ConverterEvent::ConvertSucceeded)?;
                Ok(artifact)
            }
            Err(error) => {
                self.apply(ConverterEvent::ConvertFailed(error.to_string()))?;
                Err(error)
            }
        }
    }
}
