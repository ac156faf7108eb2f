use crate::model::{Bar, Symbol};

/// Narrative analysis of the loaded bars. Lives beside the chart and never alters it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Pending,
    Ready(String),
    Failed(String),
}

impl AnalysisState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisState::Pending)
    }
}

/// Identifies one analysis request. Completing with a ticket that is no longer current is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTicket {
    pub(super) generation: u64,
    pub(super) request: u64,
    symbol: Symbol,
    bars: Vec<Bar>,
}

impl AnalysisTicket {
    pub(super) fn new(generation: u64, request: u64, symbol: Symbol, bars: Vec<Bar>) -> Self {
        Self {
            generation,
            request,
            symbol,
            bars,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Bars the analysis should be based on, as loaded when the request was issued.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}
