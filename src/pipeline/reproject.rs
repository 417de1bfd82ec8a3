//! Coordinate reference systems and reprojection
//!
//! Boundaries are served as longitude/latitude (EPSG:4326). Sources arrive in
//! geographic NAD83 (Census cartographic boundary files), WGS 84, or spherical
//! Web Mercator.

use geo::{Coord, MapCoordsInPlace, MultiPolygon};
use std::f64::consts::FRAC_PI_2;
#[cfg(test)]
use std::f64::consts::PI;

use super::error::{PipelineError, PipelineResult};

/// Earth radius of the spherical Mercator projection, in metres
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Supported coordinate reference systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, WGS 84 longitude/latitude
    Wgs84,
    /// EPSG:4269, NAD83 longitude/latitude
    Nad83,
    /// EPSG:3857, spherical Web Mercator metres
    WebMercator,
}

impl Crs {
    /// EPSG code
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::Nad83 => 4269,
            Crs::WebMercator => 3857,
        }
    }

    /// Detect the CRS described by a `.prj` WKT string
    pub fn from_wkt(wkt: &str) -> PipelineResult<Self> {
        let upper = wkt.to_uppercase();

        if upper.contains("PROJCS[") {
            let mercator = [
                "MERCATOR_AUXILIARY_SPHERE",
                "PSEUDO-MERCATOR",
                "POPULAR VISUALISATION",
                "WEB_MERCATOR",
            ];
            if mercator.iter().any(|m| upper.contains(m)) {
                return Ok(Crs::WebMercator);
            }
        } else if upper.contains("GEOGCS[") {
            if ["NORTH_AMERICAN_1983", "NAD83", "NAD_1983"]
                .iter()
                .any(|n| upper.contains(n))
            {
                return Ok(Crs::Nad83);
            }
            if ["WGS_1984", "WGS 84", "WGS84"].iter().any(|n| upper.contains(n)) {
                return Ok(Crs::Wgs84);
            }
        }

        Err(PipelineError::UnsupportedCrs(wkt_name(wkt)))
    }

    /// Reproject a geometry from this CRS to EPSG:4326 in place
    pub fn to_wgs84(&self, geometry: &mut MultiPolygon<f64>) {
        match self {
            // NAD83 and WGS 84 differ by less than display precision; PROJ's
            // default transformation between them is also a no-op
            Crs::Wgs84 | Crs::Nad83 => {}
            Crs::WebMercator => geometry.map_coords_in_place(web_mercator_to_lon_lat),
        }
    }

    /// Reproject every geometry, returning how many were transformed
    pub fn reproject_all<'a>(
        &self,
        geometries: impl IntoIterator<Item = &'a mut MultiPolygon<f64>>,
    ) -> usize {
        let mut count = 0;
        for geometry in geometries {
            self.to_wgs84(geometry);
            count += 1;
        }
        count
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl std::str::FromStr for Crs {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }
        let code = upper.rsplit(':').next().unwrap_or("");
        match code {
            "4326" => Ok(Crs::Wgs84),
            "4269" => Ok(Crs::Nad83),
            "3857" | "900913" | "102100" => Ok(Crs::WebMercator),
            _ => Err(PipelineError::UnsupportedCrs(s.to_string())),
        }
    }
}

fn web_mercator_to_lon_lat(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (c.y / WEB_MERCATOR_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    Coord {
        x: lon.clamp(-180.0, 180.0),
        y: lat,
    }
}

/// Name of the outermost WKT node, for error messages
fn wkt_name(wkt: &str) -> String {
    wkt.split('"')
        .nth(1)
        .map(str::to_string)
        .unwrap_or_else(|| wkt.chars().take(40).collect())
}

#[cfg(test)]
fn lon_lat_to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let x = c.x.to_radians() * WEB_MERCATOR_RADIUS;
    let y = (PI / 4.0 + c.y.to_radians() / 2.0).tan().ln() * WEB_MERCATOR_RADIUS;
    Coord { x, y }
}
