//! Stage glue: canonical raster -> three independent decoders -> aggregate.
//!
//! The decoders only read the raster, so their order is irrelevant. A stage
//! that finds nothing still yields a result; later stages always run.

use crate::answers::read_answers;
use crate::config::ScanConfig;
use crate::identifier::read_identifier;
use crate::raster::CanonicalRaster;
use crate::recognition::{aggregate, RecognitionResult};
use crate::sampler::FillSampler;
use crate::student_id::read_student_id;
use crate::template::SheetTemplate;

pub(crate) fn scan_raster(
    raster: &CanonicalRaster,
    template: &SheetTemplate,
    config: &ScanConfig,
) -> RecognitionResult {
    let gray = raster.as_gray();
    let px = template.pixels();

    let identifier = read_identifier(gray, px.identifier_region, &config.identifier_field);
    let sampler = FillSampler::new(gray, px.bubble_radius, config.luminance_cutoff);
    let student_id = read_student_id(sampler, px, template.id_prefixes, config.accept_threshold);
    let answers = read_answers(sampler, px, config.accept_threshold);

    let result = aggregate(identifier, student_id, answers);
    tracing::info!(
        "scan: identifier={:?} student_id={:?} unmarked={} confidence={:.3}",
        result.identifier,
        result.student_id,
        result.unmarked_count(),
        result.confidence,
    );
    if !result.errors.is_empty() {
        tracing::debug!("scan errors: {:?}", result.errors);
    }
    result
}
