use super::PipelineExecutor;
use super::serialization::{array_file_name, write_array};
use crate::common::RunConfig;
use crate::domain::{
    ArtifactKind, GridDimension, Pipeline, PipelineArtifact, PipelineResult, PointCoordinates,
    format_float_token,
};
use crate::simdir::{GridFunction, SimDir};
use ndarray::Array2;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractPointRequest {
    pub variable: String,
    pub dimension: GridDimension,
    pub coordinates: PointCoordinates,
    pub outname: Option<String>,
}

impl ExtractPointRequest {
    pub fn new(variable: impl Into<String>, dimension: GridDimension) -> Self {
        Self {
            variable: variable.into(),
            dimension,
            coordinates: PointCoordinates::default(),
            outname: None,
        }
    }

    /// Explicit output name, or `{variable}_x_{x}...` over the coordinates the
    /// dimension uses. Names that are not `.npz` end in `.npy`.
    pub fn output_name(&self) -> String {
        let name = self.outname.clone().unwrap_or_else(|| {
            self.dimension
                .axes()
                .iter()
                .filter_map(|axis| {
                    self.coordinates
                        .get(*axis)
                        .map(|value| format!("_{}_{}", axis.label(), format_float_token(value)))
                })
                .fold(self.variable.clone(), |name, part| name + &part)
        });
        array_file_name(&name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractPointPipeline;

impl PipelineExecutor for ExtractPointPipeline {
    type Request = ExtractPointRequest;
    type Output = PipelineArtifact;

    fn pipeline(&self) -> Pipeline {
        Pipeline::ExtractPoint
    }

    fn execute(
        &self,
        config: &RunConfig,
        request: &ExtractPointRequest,
    ) -> PipelineResult<PipelineArtifact> {
        let point = request.coordinates.point_for(request.dimension)?;
        let output_path = config.output_path(request.output_name());

        debug!(
            variable = %request.variable,
            "Reading grid function. This may take a while."
        );
        let simdir = SimDir::from_config(config)?;
        let catalog = simdir.gridfunctions(request.dimension)?;
        if !catalog.contains(&request.variable) {
            debug!(available = ?catalog.names(), "grid function is not available");
        }
        let function = catalog.load(&request.variable)?;

        debug!("Dumping data into output buffer. This may take a while.");
        let rows = extract_rows(&function, &point)?;

        debug!(path = %output_path.display(), "Serializing data.");
        write_array(&output_path, &rows)?;
        info!(
            path = %output_path.display(),
            iterations = rows.nrows(),
            "wrote point extraction"
        );
        Ok(PipelineArtifact::new(ArtifactKind::ArrayDump, output_path))
    }
}

/// `(iteration, time, value)` rows in ascending iteration order.
pub fn extract_rows(function: &GridFunction, point: &[f64]) -> PipelineResult<Array2<f64>> {
    let iterations = function.available_iterations();
    let mut rows = Array2::zeros((iterations.len(), 3));
    for (row, iteration) in iterations.into_iter().enumerate() {
        rows[(row, 0)] = iteration as f64;
        rows[(row, 1)] = function.time_at_iteration(iteration)?;
        rows[(row, 2)] = function.evaluate(iteration, point)?;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::ExtractPointRequest;
    use crate::domain::{GridDimension, PointCoordinates};

    #[test]
    fn default_names_use_only_the_dimension_axes() {
        let mut request = ExtractPointRequest::new("rho", GridDimension::Xz);
        request.coordinates = PointCoordinates::new(Some(1.0), Some(7.0), Some(-2.5));
        assert_eq!(request.output_name(), "rho_x_1.0_z_-2.5.npy");

        request.dimension = GridDimension::Y;
        assert_eq!(request.output_name(), "rho_y_7.0.npy");
    }

    #[test]
    fn explicit_names_keep_archive_extension() {
        let mut request = ExtractPointRequest::new("rho", GridDimension::X);
        request.outname = Some("center.npz".to_string());
        assert_eq!(request.output_name(), "center.npz");
        request.outname = Some("center".to_string());
        assert_eq!(request.output_name(), "center.npy");
    }
}
