use ndarray::Array2;
use ndarray_npy::{NpzReader, read_npy};
use nrpost_core::common::RunConfig;
use nrpost_core::domain::{
    ArtifactKind, GridDimension, PointCoordinates, PostErrorCategory,
};
use nrpost_core::modules::{ExtractPointPipeline, ExtractPointRequest, PipelineExecutor};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `rho(x) = 2 x + iteration` on x = 0..4, split across two restarts that
/// share iteration 2.
fn write_simulation(root: &Path) {
    let header = "# 1:it 2:tl 3:rl 4:c 5:ml 6:ix 7:iy 8:iz 9:time 10:x 11:y 12:z 13:data\n";
    for (restart, iterations) in [("output-0000", [0, 2]), ("output-0001", [2, 4])] {
        let directory = root.join(restart).join("sim");
        fs::create_dir_all(&directory).unwrap();

        let mut content = String::from(header);
        for iteration in iterations {
            let time = iteration as f64 * 0.25;
            let _ = writeln!(content, "# iteration {iteration}");
            for ix in 0..5 {
                let x = ix as f64;
                let value = 2.0 * x + iteration as f64;
                let _ = writeln!(
                    content,
                    "{iteration} 0 0 0 0 {ix} 0 0 {time} {x} 0 0 {value}"
                );
            }
        }
        fs::write(directory.join("rho.x.asc"), content).unwrap();
    }
}

fn config(root: &Path) -> RunConfig {
    let outdir = root.join("out");
    fs::create_dir_all(&outdir).unwrap();
    RunConfig {
        datadir: root.join("sim-data"),
        outdir,
        ..RunConfig::default()
    }
}

#[test]
fn point_values_are_extracted_for_every_iteration() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    write_simulation(&config.datadir);

    let mut request = ExtractPointRequest::new("rho", GridDimension::X);
    request.coordinates = PointCoordinates::new(Some(1.5), None, Some(9.0));

    let artifact = ExtractPointPipeline
        .execute(&config, &request)
        .expect("extraction should succeed");
    assert_eq!(artifact.kind, ArtifactKind::ArrayDump);
    assert_eq!(artifact.path, config.outdir.join("rho_x_1.5.npy"));

    let rows: Array2<f64> = read_npy(&artifact.path).expect("array should reload");
    assert_eq!(rows.dim(), (3, 3));
    for (row, iteration) in [0.0, 2.0, 4.0].into_iter().enumerate() {
        assert_eq!(rows[(row, 0)], iteration);
        assert_eq!(rows[(row, 1)], iteration * 0.25);
        assert!((rows[(row, 2)] - (3.0 + iteration)).abs() < 1.0e-12);
    }
}

#[test]
fn archive_output_holds_a_single_array() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    write_simulation(&config.datadir);

    let mut request = ExtractPointRequest::new("rho", GridDimension::X);
    request.coordinates = PointCoordinates::new(Some(4.0), None, None);
    request.outname = Some("edge.npz".to_string());

    let artifact = ExtractPointPipeline
        .execute(&config, &request)
        .expect("extraction should succeed");
    let mut archive = NpzReader::new(fs::File::open(&artifact.path).unwrap()).unwrap();
    let rows: Array2<f64> = archive.by_index(0).unwrap();
    assert_eq!(rows.column(2).to_vec(), vec![8.0, 10.0, 12.0]);
}

#[test]
fn unknown_variables_and_outside_points_are_not_found() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    write_simulation(&config.datadir);

    let mut request = ExtractPointRequest::new("press", GridDimension::X);
    request.coordinates = PointCoordinates::new(Some(1.0), None, None);
    let error = ExtractPointPipeline
        .execute(&config, &request)
        .expect_err("press is not written");
    assert_eq!(error.category(), PostErrorCategory::NotFound);
    assert_eq!(error.exit_code(), 1);
    assert!(error.message().contains("rho"));

    request.variable = "rho".to_string();
    request.coordinates = PointCoordinates::new(Some(7.5), None, None);
    let error = ExtractPointPipeline
        .execute(&config, &request)
        .expect_err("x = 7.5 lies outside the grid");
    assert_eq!(error.category(), PostErrorCategory::NotFound);
}

#[test]
fn missing_coordinates_are_rejected_before_reading() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());

    let request = ExtractPointRequest::new("rho", GridDimension::Yz);
    let error = ExtractPointPipeline
        .execute(&config, &request)
        .expect_err("no coordinates were given");
    assert_eq!(error.category(), PostErrorCategory::InvalidArgument);
    assert_eq!(
        error.message(),
        "To extract 0D data from 2D yz data, use -y <value> -z <value>"
    );
}

#[test]
fn header_only_grid_function_writes_an_empty_table() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let directory = config.datadir.join("output-0000");
    fs::create_dir_all(&directory).unwrap();
    fs::write(
        directory.join("rho.x.asc"),
        "# 1:it 2:tl 3:rl 4:c 5:ml 6:ix 7:iy 8:iz 9:time 10:x 11:y 12:z 13:data\n",
    )
    .unwrap();

    let mut request = ExtractPointRequest::new("rho", GridDimension::X);
    request.coordinates = PointCoordinates::new(Some(0.0), None, None);
    let artifact = ExtractPointPipeline
        .execute(&config, &request)
        .expect("no iterations still yields a dump");
    let rows: Array2<f64> = read_npy(&artifact.path).expect("array should reload");
    assert_eq!(rows.dim(), (0, 3));
}
