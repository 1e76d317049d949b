// src/application/commands/generate_commands.rs

use log::info;

use crate::application::dto::{GenerationRequestDto, GenerationResultDto};
use crate::application::error_handling::{ErrorResponse, ToErrorResponse};
use crate::application::state::AppState;
use crate::services::CancellationToken;

/// Generate the deck document.
///
/// Progress is published on `AppState::subscribe_progress`; `cancel` is
/// honoured at the next card boundary and yields a `Cancelled` result.
pub async fn generate_document(
    state: &AppState,
    request: GenerationRequestDto,
    cancel: CancellationToken,
) -> Result<GenerationResultDto, ErrorResponse> {
    let request = request.validate().to_error_response()?;
    info!("Generating '{}'", request.list_name);

    let outcome = state
        .render_service
        .run(request, &cancel)
        .await
        .to_error_response()?;

    Ok(GenerationResultDto::from(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;
    use crate::application::test_support::test_state;

    fn dto(mode: &str) -> GenerationRequestDto {
        GenerationRequestDto {
            list_name: "Angels".to_string(),
            card_list: "2 Serra Angel\nMissing".to_string(),
            mode: mode.to_string(),
            lands: "none".to_string(),
            printings: "include".to_string(),
            layout: "paged".to_string(),
            advice: Some("Add **more** angels.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_reports_and_streams_progress() {
        let (state, _dir) = test_state();
        let mut progress = state.subscribe_progress();

        let result = generate_document(&state, dto("both"), CancellationToken::new())
            .await
            .unwrap();

        match result {
            GenerationResultDto::Completed(report) => {
                assert_eq!(report.pages, 2);
                assert_eq!(report.total_cards, 2);
                assert_eq!(report.skipped, vec!["Missing"]);
                assert!(report.output_path.ends_with("Angels.pdf"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let tick = progress.try_recv().unwrap();
        assert_eq!(tick.card_name, "Serra Angel");
        assert_eq!(tick.percent, 100);
    }

    #[tokio::test]
    async fn test_cancelled_generation_is_not_an_error() {
        let (state, _dir) = test_state();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = generate_document(&state, dto("cards"), cancel).await.unwrap();
        assert!(matches!(
            result,
            GenerationResultDto::Cancelled { pages_rendered: 0 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_maps_to_validation() {
        let (state, _dir) = test_state();
        let mut request = dto("both");
        request.list_name = String::new();

        let err = generate_document(&state, request, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
    }
}
