//! Boundary sources
//!
//! County polygons come from a national boundary file, filtered down to one
//! state by FIPS code. Two formats are supported:
//! - ESRI shapefile (`.shp` + `.dbf` attributes + optional `.prj` CRS)
//! - GeoJSON FeatureCollection

use geo::{Geometry, LineString, MultiPolygon, Polygon};
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value as JsonValue;
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::path::{Path, PathBuf};

use super::error::{PipelineError, PipelineResult};
use super::reproject::Crs;
use super::types::BoundaryRow;
use crate::config::BoundaryConfig;

/// Which attributes identify a county and which state to keep
#[derive(Debug, Clone)]
pub struct BoundaryFilter {
    /// FIPS code of the target state, e.g. "27"
    pub state_fips: String,
    pub state_column: String,
    pub name_column: String,
    pub geoid_column: String,
}

impl From<&BoundaryConfig> for BoundaryFilter {
    fn from(config: &BoundaryConfig) -> Self {
        Self {
            state_fips: config.state_fips.trim().to_string(),
            state_column: config.state_column.clone(),
            name_column: config.name_column.clone(),
            geoid_column: config.geoid_column.clone(),
        }
    }
}

/// Boundary rows for one state plus the CRS they are stored in
#[derive(Debug, Clone)]
pub struct BoundarySet {
    pub rows: Vec<BoundaryRow>,
    pub crs: Crs,
    /// Records in the source before the state filter
    pub total: usize,
    /// In-state records skipped because their geometry is not a polygon
    pub rejected: Vec<String>,
}

/// A readable boundary file
pub trait BoundarySource {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Read every record belonging to the filtered state
    fn read(&self, filter: &BoundaryFilter) -> PipelineResult<BoundarySet>;
}

/// Open the boundary source named by the configuration, by file extension
pub fn open_boundary_source(config: &BoundaryConfig) -> PipelineResult<Box<dyn BoundarySource>> {
    let crs_override = config.crs.as_deref().map(str::parse::<Crs>).transpose()?;
    let path = PathBuf::from(&config.path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("shp") => Ok(Box::new(ShapefileSource::new(path, crs_override))),
        Some("geojson") | Some("json") => Ok(Box::new(GeoJsonSource::new(path, crs_override))),
        _ => Err(PipelineError::UnsupportedFormat(path)),
    }
}

// ============================================
// SHAPEFILE
// ============================================

/// ESRI shapefile with a dBase attribute table
pub struct ShapefileSource {
    path: PathBuf,
    crs_override: Option<Crs>,
}

impl ShapefileSource {
    pub fn new(path: impl Into<PathBuf>, crs_override: Option<Crs>) -> Self {
        Self {
            path: path.into(),
            crs_override,
        }
    }

    /// CRS from the override, the sibling `.prj` file, or NAD83
    fn detect_crs(&self) -> PipelineResult<Crs> {
        if let Some(crs) = self.crs_override {
            return Ok(crs);
        }

        let prj = self.path.with_extension("prj");
        if !prj.exists() {
            tracing::debug!(path = ?prj, "No .prj file, assuming NAD83");
            return Ok(Crs::Nad83);
        }

        let wkt = std::fs::read_to_string(&prj).map_err(|e| PipelineError::io(&prj, e))?;
        Crs::from_wkt(&wkt)
    }
}

impl BoundarySource for ShapefileSource {
    fn describe(&self) -> String {
        format!("shapefile {}", self.path.display())
    }

    fn read(&self, filter: &BoundaryFilter) -> PipelineResult<BoundarySet> {
        if !self.path.exists() {
            return Err(PipelineError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "boundary file not found"),
            ));
        }

        let crs = self.detect_crs()?;
        let mut reader = shapefile::Reader::from_path(&self.path)?;

        let mut rows = Vec::new();
        let mut rejected = Vec::new();
        let mut total = 0;
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result?;
            total += 1;

            let state = record.get(&filter.state_column).and_then(field_text);
            if state.as_deref().map(str::trim) != Some(filter.state_fips.as_str()) {
                continue;
            }

            let name = record
                .get(&filter.name_column)
                .and_then(field_text)
                .unwrap_or_default();
            let geoid = record.get(&filter.geoid_column).and_then(field_text);
            let geometry = match shape_to_multipolygon(shape) {
                Ok(geometry) => geometry,
                Err(kind) => {
                    reject(&mut rejected, &name, &kind);
                    continue;
                }
            };

            rows.push(BoundaryRow {
                state_fips: filter.state_fips.clone(),
                county: name.trim().to_string(),
                name,
                geoid,
                geometry,
            });
        }

        Ok(BoundarySet {
            rows,
            crs,
            total,
            rejected,
        })
    }
}

fn field_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(Some(s)) => Some(s.clone()),
        // Some exports store FIPS codes as numbers
        FieldValue::Numeric(Some(n)) => Some(format!("{:02}", *n as i64)),
        _ => None,
    }
}

/// Polygon shapes as a multipolygon; any other shape type is returned as `Err(kind)`
fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>, String> {
    match shape {
        Shape::Polygon(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y))),
        Shape::PolygonM(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y))),
        Shape::PolygonZ(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y))),
        other => Err(format!("{:?}", other.shapetype())),
    }
}

fn reject(rejected: &mut Vec<String>, name: &str, kind: &str) {
    tracing::warn!(county = %name.trim(), kind, "Skipping boundary with non-polygon geometry");
    rejected.push(name.trim().to_string());
}

/// Group shapefile rings into polygons: each outer ring starts a polygon and
/// the inner rings that follow it are its holes.
fn rings_to_multipolygon<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64),
) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for ring in rings {
        let (points, is_hole) = match ring {
            PolygonRing::Outer(points) => (points, false),
            PolygonRing::Inner(points) => (points, true),
        };
        let line: LineString<f64> = points.iter().map(&xy).collect();

        match polygons.last_mut() {
            Some((_, holes)) if is_hole => holes.push(line),
            _ => polygons.push((line, Vec::new())),
        }
    }

    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(exterior, holes)| Polygon::new(exterior, holes))
            .collect(),
    )
}

// ============================================
// GEOJSON
// ============================================

/// GeoJSON FeatureCollection with county attributes in feature properties
pub struct GeoJsonSource {
    path: PathBuf,
    crs_override: Option<Crs>,
}

impl GeoJsonSource {
    pub fn new(path: impl Into<PathBuf>, crs_override: Option<Crs>) -> Self {
        Self {
            path: path.into(),
            crs_override,
        }
    }

    /// Parse a GeoJSON document held in memory
    pub fn parse(
        data: &str,
        filter: &BoundaryFilter,
        crs_override: Option<Crs>,
    ) -> PipelineResult<BoundarySet> {
        let collection = match data.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(PipelineError::GeoJson(
                    "expected a FeatureCollection".to_string(),
                ))
            }
        };

        let crs = match crs_override {
            Some(crs) => crs,
            None => legacy_crs(&collection)?.unwrap_or(Crs::Wgs84),
        };

        let total = collection.features.len();
        let mut rows = Vec::new();
        let mut rejected = Vec::new();
        for feature in collection.features {
            let state = feature.property(&filter.state_column).and_then(property_text);
            if state.as_deref().map(str::trim) != Some(filter.state_fips.as_str()) {
                continue;
            }

            let name = feature
                .property(&filter.name_column)
                .and_then(property_text)
                .unwrap_or_default();
            let geoid = feature.property(&filter.geoid_column).and_then(property_text);

            let Some(geometry) = feature.geometry else {
                reject(&mut rejected, &name, "null");
                continue;
            };
            let geometry = match Geometry::<f64>::try_from(geometry.value)? {
                Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                Geometry::MultiPolygon(multi) => multi,
                other => {
                    reject(&mut rejected, &name, geometry_kind(&other));
                    continue;
                }
            };

            rows.push(BoundaryRow {
                state_fips: filter.state_fips.clone(),
                county: name.trim().to_string(),
                name,
                geoid,
                geometry,
            });
        }

        Ok(BoundarySet {
            rows,
            crs,
            total,
            rejected,
        })
    }
}

impl BoundarySource for GeoJsonSource {
    fn describe(&self) -> String {
        format!("geojson {}", self.path.display())
    }

    fn read(&self, filter: &BoundaryFilter) -> PipelineResult<BoundarySet> {
        let data = read_text(&self.path)?;
        Self::parse(&data, filter, self.crs_override)
    }
}

fn read_text(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

/// The pre-RFC 7946 `crs` member, when present
fn legacy_crs(collection: &FeatureCollection) -> PipelineResult<Option<Crs>> {
    collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(JsonValue::as_str)
        .map(str::parse::<Crs>)
        .transpose()
}

fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => n.as_i64().map(|n| format!("{:02}", n)),
        _ => None,
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
