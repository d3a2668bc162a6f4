use super::loader::Raster;

/// Scales the color channels of every sample to `percent` of their value.
///
/// Alpha is left alone so transparency survives dimming.
pub fn apply_brightness(raster: &mut Raster, percent: u8) {
    let percent = u16::from(percent.min(100));
    if percent == 100 {
        return;
    }

    for sample in raster.rows.iter_mut().flatten() {
        for channel in &mut sample[..3] {
            *channel = (u16::from(*channel) * percent / 100) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_brightness_is_identity() {
        let mut raster = Raster::new(vec![vec![[255, 128, 1, 7]]]);
        apply_brightness(&mut raster, 100);
        assert_eq!(raster.rows[0][0], [255, 128, 1, 7]);
    }

    #[test]
    fn test_alpha_is_preserved() {
        let mut raster = Raster::new(vec![vec![[255, 255, 255, 0]], vec![[10, 20, 30, 200]]]);
        apply_brightness(&mut raster, 10);
        assert_eq!(raster.rows[0][0], [25, 25, 25, 0]);
        assert_eq!(raster.rows[1][0], [1, 2, 3, 200]);
    }
}
