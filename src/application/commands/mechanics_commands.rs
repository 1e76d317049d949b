// src/application/commands/mechanics_commands.rs

use crate::application::dto::MechanicsReportDto;
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;

/// Explain the mechanics of every card in the list
pub async fn explain_mechanics(
    state: &AppState,
    card_list: &str,
) -> Result<Vec<MechanicsReportDto>, ErrorResponse> {
    if card_list.trim().is_empty() {
        return Err(ErrorResponse::validation(
            "Enter at least one card".to_string(),
        ));
    }

    let reports = state.mechanics_service.explain(card_list).await;
    Ok(reports.into_iter().map(MechanicsReportDto::from).collect())
}
