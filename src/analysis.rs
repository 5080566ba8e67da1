use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::SourceError;
use crate::model::{CodeModel, IngestReport};
use crate::source::SourceUnit;
use crate::structure::{java_parser, parse_unit_with};
use crate::syntax::SyntaxUnit;

#[derive(Debug, Default, Serialize)]
pub struct Analysis {
    pub model: CodeModel,
    pub reports: Vec<IngestReport>,
}

impl Analysis {
    pub fn skipped_declarations(&self) -> usize {
        self.reports.iter().map(|r| r.errors.len()).sum()
    }
}

/// Parses units in parallel, then ingests them in input order so
/// last-write-wins collisions are deterministic.
pub fn analyze(units: &[SourceUnit]) -> Result<Analysis, SourceError> {
    let parsed: Vec<Result<SyntaxUnit, SourceError>> = units
        .par_iter()
        .map_init(java_parser, |parser, unit| match parser {
            Ok(parser) => parse_unit_with(parser, &unit.origin, &unit.text),
            Err(e) => Err(SourceError::Grammar {
                message: e.to_string(),
            }),
        })
        .collect();

    let mut analysis = Analysis::default();
    for syntax in parsed {
        let report = analysis.model.ingest(syntax?);
        analysis.reports.push(report);
    }

    info!(
        classes = analysis.model.classes.len(),
        enums = analysis.model.enums.len(),
        skipped = analysis.skipped_declarations(),
        "built code model"
    );
    Ok(analysis)
}
