//! Shared render pipeline used by the CLI and the TUI.
//!
//! fetch -> index records -> extract layers -> paint counties -> lay out legend
//!
//! Front-ends only differ in how they present the resulting `Scene`.

use tracing::info;

use crate::data::{DatasetClient, FipsIndex, Payloads, Sources, Topology, extract_layers};
use crate::domain::{DataSource, EducationRecord, JoinPolicy, MapLayers, OutputFormat, RenderConfig};
use crate::error::{AppError, ErrorKind};
use crate::render::{CountyPaint, LegendLayout, bucket_counts, legend_layout, paint_counties, render_document};
use crate::report::RunSummary;
use crate::scale::{MISSING_FILL, QuantizeScale, Rgb};

/// Everything needed to draw the map, independent of the output medium.
#[derive(Debug, Clone)]
pub struct Scene {
    pub index: FipsIndex,
    pub layers: MapLayers,
    /// Parallel to `layers.counties`.
    pub paints: Vec<CountyPaint>,
    pub scale: QuantizeScale,
    pub legend: LegendLayout,
}

impl Scene {
    /// Join, color and lay out. Pure: same payloads give the same scene.
    pub fn build(
        records: Vec<EducationRecord>,
        topology: &Topology,
        policy: JoinPolicy,
        missing_fill: Rgb,
    ) -> Result<Self, AppError> {
        let index = FipsIndex::build(records);
        let layers = extract_layers(topology)?;
        let scale = QuantizeScale::map_fill();
        let paints = paint_counties(&layers.counties, &index, &scale, policy, missing_fill)?;
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        Ok(Self {
            index,
            layers,
            paints,
            scale,
            legend,
        })
    }

    pub fn missing_count(&self) -> usize {
        self.paints.iter().filter(|p| p.is_missing()).count()
    }
}

/// All computed outputs of a single `choro render` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub scene: Scene,
    /// The serialized SVG or HTML document.
    pub document: String,
    pub summary: RunSummary,
}

/// Fetch both datasets and render.
pub fn run_render(config: &RenderConfig) -> Result<RunOutput, AppError> {
    let sources = Sources {
        education: config.education.clone(),
        topology: config.topology.clone(),
    };
    let payloads = DatasetClient::new().fetch_all(&sources)?;
    run_render_with_payloads(config, payloads)
}

/// Render from payloads that are already in memory.
pub fn run_render_with_payloads(config: &RenderConfig, payloads: Payloads) -> Result<RunOutput, AppError> {
    let Payloads { records, topology } = payloads;
    let record_count = records.len();
    let scene = Scene::build(records, &topology, config.join_policy, config.missing_fill)?;
    let document = render_document(config.format, &scene.layers, &scene.paints, &scene.legend);

    let summary = RunSummary {
        records: record_count,
        overwritten: scene.index.overwritten(),
        counties: scene.layers.counties.len(),
        states: scene.layers.states.len(),
        missing: scene.missing_count(),
        bucket_counts: bucket_counts(&scene.paints, scene.scale.bucket_count()),
        format: config.format,
    };
    info!(
        counties = summary.counties,
        states = summary.states,
        missing = summary.missing,
        "rendered map"
    );

    Ok(RunOutput {
        scene,
        document,
        summary,
    })
}

/// Load a scene for the interactive preview.
pub fn load_preview_scene(sources: &Sources, policy: JoinPolicy) -> Result<Scene, AppError> {
    let payloads = DatasetClient::new().fetch_all(sources)?;
    Scene::build(payloads.records, &payloads.topology, policy, MISSING_FILL)
}

/// Fetch the education dataset only (for `choro lookup`).
pub fn load_index(source: &DataSource) -> Result<FipsIndex, AppError> {
    let records = DatasetClient::new().fetch_education(source)?;
    Ok(FipsIndex::build(records))
}

/// Reject an output extension that contradicts `--format`. Checked before any fetch.
pub fn ensure_output_format(config: &RenderConfig) -> Result<(), AppError> {
    let ext = config
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let clash = matches!(
        (config.format, ext.as_deref()),
        (OutputFormat::Svg, Some("html" | "htm")) | (OutputFormat::Html, Some("svg"))
    );
    if clash {
        return Err(AppError::new(
            ErrorKind::Usage,
            format!(
                "Output '{}' does not match --format {:?}.",
                config.output.display(),
                config.format
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_json;
    use crate::render::fips_colors;
    use crate::scale::GREENS_7;
    use std::path::PathBuf;

    /// Three unit squares side by side (counties 1001, 1003, 1005) and one
    /// state covering all of them.
    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
            [[10, 0], [20, 0], [20, 10], [10, 10], [10, 0]],
            [[20, 0], [30, 0], [30, 10], [20, 10], [20, 0]],
            [[0, 0], [30, 0], [30, 10], [0, 10], [0, 0]]
        ],
        "objects": {
            "counties": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 1001, "arcs": [[0]]},
                {"type": "Polygon", "id": 1003, "arcs": [[1]]},
                {"type": "Polygon", "id": "1005", "arcs": [[2]]}
            ]},
            "states": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": "01", "arcs": [[3]]}
            ]}
        }
    }"#;

    fn records() -> Vec<EducationRecord> {
        vec![
            EducationRecord {
                fips: 1001,
                area_name: "Autauga County".to_string(),
                state: "AL".to_string(),
                bachelors_or_higher: 20.0,
            },
            EducationRecord {
                fips: 1003,
                area_name: "Baldwin County".to_string(),
                state: "AL".to_string(),
                bachelors_or_higher: 40.0,
            },
        ]
    }

    fn payloads() -> Payloads {
        Payloads {
            records: records(),
            topology: parse_json(TOPOLOGY, "topology").unwrap(),
        }
    }

    fn config(policy: JoinPolicy) -> RenderConfig {
        RenderConfig {
            education: DataSource::parse("education.json"),
            topology: DataSource::parse("counties.json"),
            output: PathBuf::from("map.svg"),
            format: OutputFormat::Svg,
            join_policy: policy,
            missing_fill: MISSING_FILL,
            export_colors: None,
            summary: true,
        }
    }

    #[test]
    fn fail_policy_names_the_unjoined_county() {
        let err = run_render_with_payloads(&config(JoinPolicy::Fail), payloads()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingJoinKey);
        assert!(err.to_string().contains("1005"));
    }

    #[test]
    fn mark_policy_renders_every_county() {
        let run = run_render_with_payloads(&config(JoinPolicy::Mark), payloads()).unwrap();
        let colors = fips_colors(&run.scene.paints);
        assert_eq!(colors[&1001], GREENS_7[1]);
        assert_eq!(colors[&1003], GREENS_7[4]);
        assert_eq!(colors[&1005], MISSING_FILL);

        assert_eq!(run.document.matches("class=\"county").count(), 3);
        assert!(run.document.contains(r##"class="county missing" fill="#cccccc" data-fips="1005""##));
        assert_eq!(run.document.matches("class=\"state\"").count(), 1);

        assert_eq!(run.summary.counties, 3);
        assert_eq!(run.summary.states, 1);
        assert_eq!(run.summary.missing, 1);
        assert_eq!(run.summary.bucket_counts, vec![0, 1, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = run_render_with_payloads(&config(JoinPolicy::Mark), payloads()).unwrap();
        let b = run_render_with_payloads(&config(JoinPolicy::Mark), payloads()).unwrap();
        assert_eq!(fips_colors(&a.scene.paints), fips_colors(&b.scene.paints));
        assert_eq!(a.document, b.document);
    }

    #[test]
    fn full_coverage_renders_under_fail_policy() {
        let mut p = payloads();
        p.records.push(EducationRecord {
            fips: 1005,
            area_name: "Barbour County".to_string(),
            state: "AL".to_string(),
            bachelors_or_higher: 70.0,
        });
        let run = run_render_with_payloads(&config(JoinPolicy::Fail), p).unwrap();
        assert_eq!(run.summary.missing, 0);
        // Above the domain clamps into the last bucket.
        assert_eq!(fips_colors(&run.scene.paints)[&1005], GREENS_7[6]);
    }

    #[test]
    fn output_extension_must_match_format() {
        let mut cfg = config(JoinPolicy::Fail);
        assert!(ensure_output_format(&cfg).is_ok());
        cfg.format = OutputFormat::Html;
        assert_eq!(ensure_output_format(&cfg).unwrap_err().kind(), ErrorKind::Usage);
        cfg.output = PathBuf::from("map.htm");
        assert!(ensure_output_format(&cfg).is_ok());
        cfg.output = PathBuf::from("map");
        assert!(ensure_output_format(&cfg).is_ok());
    }
}
