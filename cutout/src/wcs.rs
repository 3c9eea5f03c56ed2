//! TAN-projection world coordinate transforms.
//!
//! Implements the gnomonic (tangent plane) projection used by imaging
//! frames: a reference pixel (CRPIX), a reference sky position (CRVAL), and
//! a CD matrix encoding scale, rotation, and shear. Both directions are
//! provided; the forward direction (sky to pixel) is the one the cutout
//! pipeline depends on.

use thiserror::Error;

/// Errors from projecting a sky coordinate into pixel space.
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("CD matrix is singular (det = {0})")]
    SingularMatrix(f64),
    #[error("coordinate ({ra}, {dec}) does not project onto the tangent plane")]
    OutsideProjection { ra: f64, dec: f64 },
    #[error("projection of ({ra}, {dec}) produced a non-finite pixel location")]
    NonFinite { ra: f64, dec: f64 },
}

/// TAN world coordinate transform.
///
/// `crpix` is stored zero-based so pixel coordinates index arrays directly;
/// FITS headers record the reference pixel one-based, use
/// [`TanWcs::from_fits_cards`] when parsing a header.
#[derive(Debug, Clone, PartialEq)]
pub struct TanWcs {
    /// Reference pixel (x, y), zero-based
    pub crpix: (f64, f64),
    /// Reference sky position (RA, Dec) in degrees
    pub crval: (f64, f64),
    /// Pixel offset to intermediate sky offset, degrees:
    /// `[[CD1_1, CD1_2], [CD2_1, CD2_2]]`
    pub cd: [[f64; 2]; 2],
}

impl TanWcs {
    pub fn new(crpix: (f64, f64), crval: (f64, f64), cd: [[f64; 2]; 2]) -> Self {
        Self { crpix, crval, cd }
    }

    /// Build from raw FITS header values; converts the one-based CRPIX
    /// convention to the zero-based pixel coordinates used everywhere else.
    pub fn from_fits_cards(
        crpix1: f64,
        crpix2: f64,
        crval1: f64,
        crval2: f64,
        cd: [[f64; 2]; 2],
    ) -> Self {
        Self::new((crpix1 - 1.0, crpix2 - 1.0), (crval1, crval2), cd)
    }

    /// Axis-aligned transform from a pixel scale and rotation, mostly useful
    /// for constructing synthetic transforms.
    ///
    /// `pixel_scale` is in arcseconds per pixel, `rotation` in degrees.
    pub fn from_scale_rotation(
        crpix: (f64, f64),
        crval: (f64, f64),
        pixel_scale: f64,
        rotation: f64,
    ) -> Self {
        let scale_deg = pixel_scale / 3600.0;
        let (sin_r, cos_r) = rotation.to_radians().sin_cos();
        let cd = [
            [scale_deg * cos_r, -scale_deg * sin_r],
            [scale_deg * sin_r, scale_deg * cos_r],
        ];
        Self::new(crpix, crval, cd)
    }

    /// Convert a pixel position to sky coordinates (RA, Dec in degrees).
    pub fn pixel_to_sky(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.crpix.0;
        let dy = y - self.crpix.1;

        // Intermediate tangent-plane coordinates in radians
        let xi = (self.cd[0][0] * dx + self.cd[0][1] * dy).to_radians();
        let eta = (self.cd[1][0] * dx + self.cd[1][1] * dy).to_radians();

        let ra0 = self.crval.0.to_radians();
        let dec0 = self.crval.1.to_radians();
        let (sin_dec0, cos_dec0) = dec0.sin_cos();

        let denom = cos_dec0 - eta * sin_dec0;
        let ra = ra0 + xi.atan2(denom);
        let dec = (sin_dec0 + eta * cos_dec0).atan2((xi.powi(2) + denom.powi(2)).sqrt());

        let mut ra_deg = ra.to_degrees();
        if ra_deg < 0.0 {
            ra_deg += 360.0;
        } else if ra_deg >= 360.0 {
            ra_deg -= 360.0;
        }

        (ra_deg, dec.to_degrees())
    }

    /// Convert sky coordinates (RA, Dec in degrees) to a pixel position.
    pub fn sky_to_pixel(&self, ra: f64, dec: f64) -> Result<(f64, f64), ProjectionError> {
        let ra_rad = ra.to_radians();
        let dec_rad = dec.to_radians();
        let ra0 = self.crval.0.to_radians();
        let dec0 = self.crval.1.to_radians();

        let (sin_dec, cos_dec) = dec_rad.sin_cos();
        let (sin_dec0, cos_dec0) = dec0.sin_cos();
        let (sin_dra, cos_dra) = (ra_rad - ra0).sin_cos();

        // Gnomonic denominator; non-positive means the target is on the far
        // hemisphere and never crosses the tangent plane.
        let d = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_dra;
        if d <= 0.0 {
            return Err(ProjectionError::OutsideProjection { ra, dec });
        }

        let xi = (cos_dec * sin_dra / d).to_degrees();
        let eta = ((sin_dec * cos_dec0 - cos_dec * sin_dec0 * cos_dra) / d).to_degrees();

        let det = self.cd[0][0] * self.cd[1][1] - self.cd[0][1] * self.cd[1][0];
        if det.abs() < 1e-15 {
            return Err(ProjectionError::SingularMatrix(det));
        }

        let dx = (self.cd[1][1] * xi - self.cd[0][1] * eta) / det;
        let dy = (-self.cd[1][0] * xi + self.cd[0][0] * eta) / det;

        let x = self.crpix.0 + dx;
        let y = self.crpix.1 + dy;
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { ra, dec });
        }
        Ok((x, y))
    }
}

/// Project a sky coordinate to the nearest integer pixel.
pub fn project_to_pixel(wcs: &TanWcs, ra: f64, dec: f64) -> Result<(i64, i64), ProjectionError> {
    let (x, y) = wcs.sky_to_pixel(ra, dec)?;
    Ok((x.round() as i64, y.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_reference_pixel_maps_to_reference_coordinates() {
        let wcs = TanWcs::from_scale_rotation((512.0, 512.0), (180.0, 45.0), 1.0, 0.0);

        let (ra, dec) = wcs.pixel_to_sky(512.0, 512.0);
        assert!(approx_eq!(f64, ra, 180.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, dec, 45.0, epsilon = 1e-9));

        let (x, y) = wcs.sky_to_pixel(180.0, 45.0).unwrap();
        assert!(approx_eq!(f64, x, 512.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, y, 512.0, epsilon = 1e-9));
    }

    #[test]
    fn test_roundtrip_over_synthetic_transforms() {
        // Pixel -> sky -> pixel must return to the start across a spread of
        // scales, rotations, and reference positions.
        let cases = [
            (0.396, 0.0, (180.0, 0.0)),
            (1.0, 30.0, (10.0, -45.0)),
            (2.5, 117.0, (359.0, 60.0)),
            (0.05, -45.0, (90.0, 89.0)),
        ];
        let pixels = [(100.0, 100.0), (512.0, 512.0), (900.3, 17.8), (0.0, 0.0)];

        for (scale, rotation, crval) in cases {
            let wcs = TanWcs::from_scale_rotation((512.0, 512.0), crval, scale, rotation);
            for (x, y) in pixels {
                let (ra, dec) = wcs.pixel_to_sky(x, y);
                let (x2, y2) = wcs.sky_to_pixel(ra, dec).unwrap();
                assert!(approx_eq!(f64, x, x2, epsilon = 1e-6));
                assert!(approx_eq!(f64, y, y2, epsilon = 1e-6));
            }
        }
    }

    #[test]
    fn test_fits_cards_are_one_based() {
        // A header reference pixel of (21, 21) is array position (20, 20).
        let wcs = TanWcs::from_fits_cards(
            21.0,
            21.0,
            150.0,
            2.0,
            [[-1.1e-4, 0.0], [0.0, 1.1e-4]],
        );
        let (x, y) = wcs.sky_to_pixel(150.0, 2.0).unwrap();
        assert!(approx_eq!(f64, x, 20.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, y, 20.0, epsilon = 1e-9));
    }

    #[test]
    fn test_far_hemisphere_rejected() {
        let wcs = TanWcs::from_scale_rotation((512.0, 512.0), (180.0, 0.0), 1.0, 0.0);
        let err = wcs.sky_to_pixel(0.0, 0.0).unwrap_err();
        assert!(matches!(err, ProjectionError::OutsideProjection { .. }));
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let wcs = TanWcs::new((0.0, 0.0), (180.0, 0.0), [[1e-4, 1e-4], [1e-4, 1e-4]]);
        let err = wcs.sky_to_pixel(180.0, 0.1).unwrap_err();
        assert!(matches!(err, ProjectionError::SingularMatrix(_)));
    }

    #[test]
    fn test_project_rounds_to_nearest_pixel() {
        let wcs = TanWcs::from_scale_rotation((100.0, 100.0), (180.0, 0.0), 1.0, 0.0);
        // A sky position 0.6 pixels east of the reference must round to the
        // nearest integer, not truncate.
        let (ra, dec) = wcs.pixel_to_sky(100.6, 100.0);
        let (x, y) = project_to_pixel(&wcs, ra, dec).unwrap();
        assert_eq!((x, y), (101, 100));
    }
}
