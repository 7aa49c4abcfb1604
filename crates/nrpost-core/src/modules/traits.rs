use crate::common::RunConfig;
use crate::domain::{Pipeline, PipelineResult};

/// One command-line pipeline: validates its request, reads its inputs and
/// produces its single output.
pub trait PipelineExecutor {
    type Request;
    type Output;

    fn pipeline(&self) -> Pipeline;

    fn execute(&self, config: &RunConfig, request: &Self::Request) -> PipelineResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::PipelineExecutor;
    use crate::common::RunConfig;
    use crate::domain::{Pipeline, PipelineResult, PostError, PostErrorCategory};

    struct MissingVariable;

    impl PipelineExecutor for MissingVariable {
        type Request = String;
        type Output = ();

        fn pipeline(&self) -> Pipeline {
            Pipeline::ExtractPoint
        }

        fn execute(&self, _config: &RunConfig, request: &String) -> PipelineResult<()> {
            Err(PostError::not_found(
                "DATA.GRID_FUNCTION",
                format!("Grid function {request} is not available."),
            ))
        }
    }

    #[test]
    fn executors_report_through_the_shared_error_type() {
        let error = MissingVariable
            .execute(&RunConfig::default(), &"rho".to_string())
            .expect_err("executor should fail");
        assert_eq!(error.category(), PostErrorCategory::NotFound);
        assert_eq!(error.exit_code(), 1);
        assert_eq!(MissingVariable.pipeline().as_str(), "EXTRACT_POINT");
    }
}
