// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are surface-friendly representations (plain strings and numbers)
// - DTOs NEVER leak domain invariants
// - Conversion FROM services only, except the one inbound request

use serde::{Deserialize, Serialize};

use crate::domain::{GenerationMode, LandPolicy, PageLayout, PrintingPolicy};
use crate::error::{AppError, AppResult};
use crate::events::CardPageRendered;
use crate::infrastructure::StoredDocument;
use crate::services::{
    GenerationOptions, MechanicsReport, RenderOutcome, RenderReport, RenderRequest,
};

// ============================================================================
// GENERATION DTOs
// ============================================================================

/// Inbound request of the generate command. Option fields are the
/// user-facing spellings ("both", "basic", "exclude", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequestDto {
    pub list_name: String,
    pub card_list: String,
    pub mode: String,
    pub lands: String,
    pub printings: String,
    pub layout: String,
    pub advice: Option<String>,
}

impl GenerationRequestDto {
    /// Checks the surface input and converts it into a service request.
    pub fn validate(self) -> AppResult<RenderRequest> {
        if self.list_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Enter a name for the card list".to_string(),
            ));
        }
        if self.card_list.trim().is_empty() {
            return Err(AppError::Validation(
                "Enter at least one card".to_string(),
            ));
        }

        let options = GenerationOptions {
            mode: parse_mode(&self.mode)?,
            lands: parse_lands(&self.lands)?,
            printings: parse_printings(&self.printings)?,
            layout: parse_layout(&self.layout)?,
        };

        Ok(RenderRequest {
            list_name: self.list_name.trim().to_string(),
            card_list: self.card_list,
            options,
            advice: self.advice.filter(|text| !text.trim().is_empty()),
        })
    }
}

fn invalid(field: &str, value: &str, allowed: &str) -> AppError {
    AppError::Validation(format!(
        "Invalid {} '{}': expected one of {}",
        field, value, allowed
    ))
}

pub fn parse_mode(value: &str) -> AppResult<GenerationMode> {
    match value.trim().to_lowercase().as_str() {
        "suggestions" => Ok(GenerationMode::Suggestions),
        "cards" => Ok(GenerationMode::Cards),
        "both" | "" => Ok(GenerationMode::Both),
        other => Err(invalid("mode", other, "suggestions, cards, both")),
    }
}

pub fn parse_lands(value: &str) -> AppResult<LandPolicy> {
    match value.trim().to_lowercase().as_str() {
        "none" | "" => Ok(LandPolicy::None),
        "basic" | "basic_only" => Ok(LandPolicy::BasicOnly),
        "all" | "all_lands" => Ok(LandPolicy::AllLands),
        other => Err(invalid("land exclusion", other, "none, basic, all")),
    }
}

pub fn parse_printings(value: &str) -> AppResult<PrintingPolicy> {
    match value.trim().to_lowercase().as_str() {
        "include" | "" => Ok(PrintingPolicy::Include),
        "exclude" => Ok(PrintingPolicy::Exclude),
        other => Err(invalid("printing inclusion", other, "include, exclude")),
    }
}

pub fn parse_layout(value: &str) -> AppResult<PageLayout> {
    match value.trim().to_lowercase().as_str() {
        "paged" | "" => Ok(PageLayout::Paged),
        "continuous" => Ok(PageLayout::Continuous),
        other => Err(invalid("layout", other, "paged, continuous")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderReportDto {
    pub output_path: String,
    pub pages: usize,
    pub total_cards: u64,
    pub total_price: f64,
    pub avg_price: f64,
    pub avg_cmc: f64,
    pub colors: String,
    pub skipped: Vec<String>,
    pub excluded: Vec<String>,
}

impl From<RenderReport> for RenderReportDto {
    fn from(report: RenderReport) -> Self {
        Self {
            output_path: report.output_path.display().to_string(),
            pages: report.pages,
            total_cards: report.stats.total_count,
            total_price: report.stats.total_price,
            avg_price: report.stats.avg_price,
            avg_cmc: report.stats.avg_cmc,
            colors: report.stats.color_label(),
            skipped: report.skipped,
            excluded: report.excluded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResultDto {
    Completed(RenderReportDto),
    Cancelled { pages_rendered: usize },
}

impl From<RenderOutcome> for GenerationResultDto {
    fn from(outcome: RenderOutcome) -> Self {
        match outcome {
            RenderOutcome::Completed(report) => Self::Completed(report.into()),
            RenderOutcome::Cancelled { pages_rendered } => Self::Cancelled { pages_rendered },
        }
    }
}

/// One progress tick, sent after every completed card page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDto {
    pub card_name: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl From<&CardPageRendered> for ProgressDto {
    fn from(event: &CardPageRendered) -> Self {
        Self {
            card_name: event.card_name.clone(),
            completed: event.index + 1,
            total: event.total,
            percent: event.percent(),
        }
    }
}

// ============================================================================
// MECHANICS DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicsReportDto {
    pub card: String,
    pub oracle: String,
    /// "name: description" lines
    pub mechanics: Vec<String>,
}

impl From<MechanicsReport> for MechanicsReportDto {
    fn from(report: MechanicsReport) -> Self {
        Self {
            card: report.card,
            oracle: report.oracle_text,
            mechanics: report
                .mechanics
                .into_iter()
                .map(|m| format!("{}: {}", m.name, m.description))
                .collect(),
        }
    }
}

// ============================================================================
// DOCUMENT DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDto {
    pub name: String,
    pub path: String,
}

impl From<StoredDocument> for DocumentDto {
    fn from(document: StoredDocument) -> Self {
        Self {
            name: document.name,
            path: document.path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_dto() -> GenerationRequestDto {
        GenerationRequestDto {
            list_name: "  Mono Red  ".to_string(),
            card_list: "4 Anger".to_string(),
            mode: "cards".to_string(),
            lands: "basic".to_string(),
            printings: "exclude".to_string(),
            layout: "continuous".to_string(),
            advice: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_validate_converts_options() {
        let request = request_dto().validate().unwrap();
        assert_eq!(request.list_name, "Mono Red");
        assert_eq!(request.options.mode, GenerationMode::Cards);
        assert_eq!(request.options.lands, LandPolicy::BasicOnly);
        assert_eq!(request.options.printings, PrintingPolicy::Exclude);
        assert_eq!(request.options.layout, PageLayout::Continuous);
        assert!(request.advice.is_none());
    }

    #[test]
    fn test_validate_rejects_missing_name_and_list() {
        let mut dto = request_dto();
        dto.list_name = String::new();
        assert!(matches!(dto.validate(), Err(AppError::Validation(_))));

        let mut dto = request_dto();
        dto.card_list = "\n \n".to_string();
        assert!(matches!(dto.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unknown_option_is_validation_error() {
        let mut dto = request_dto();
        dto.mode = "everything".to_string();
        let err = dto.validate().unwrap_err();
        assert!(err.to_string().contains("everything"));
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let json =
            serde_json::to_string(&GenerationResultDto::Cancelled { pages_rendered: 2 }).unwrap();
        assert!(json.contains("\"status\":\"cancelled\""));
        assert!(json.contains("\"pages_rendered\":2"));
    }
}
