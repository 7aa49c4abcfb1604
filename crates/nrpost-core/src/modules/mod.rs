pub mod extract_point;
pub mod multipole;
pub mod serialization;
pub mod spectral;
pub mod timeseries;

mod traits;

pub use extract_point::{ExtractPointPipeline, ExtractPointRequest};
pub use multipole::{
    PlotMultipolePipeline, PlotMultipoleRequest, SaveMultipolePipeline, SaveMultipoleRequest,
};
pub use spectral::{SpectralMode, SpectralOutcome, SpectralPipeline, SpectralRequest};
pub use timeseries::{PlotTimeseriesPipeline, PlotTimeseriesRequest};
pub use traits::PipelineExecutor;
