lazy_static! {
    /// Non-linear mixer output for the two pulse channels summed, per the
    /// hardware's resistor ladder.
    pub static ref PULSE_TABLE: [f32; 31] = {
        let mut table = [0.0; 31];

        for (n, entry) in table.iter_mut().enumerate().skip(1) {
            *entry = 95.52 / (8128.0 / n as f32 + 100.0);
        }

        table
    };
}

/// Mixes the triangle and noise channels. The triangle level is fractional
/// because of the cross-fade, so this stays a formula instead of a table.
pub fn mix_tnd(triangle: f32, noise: u8) -> f32 {
    let sum = triangle / 8227.0 + noise as f32 / 12241.0;

    if sum == 0.0 {
        0.0
    } else {
        159.79 / (1.0 / sum + 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_table_is_monotonic() {
        assert_eq!(PULSE_TABLE[0], 0.0);

        for n in 1..31 {
            assert!(PULSE_TABLE[n] > PULSE_TABLE[n - 1]);
        }

        assert!(PULSE_TABLE[30] < 1.0);
    }

    #[test]
    fn tnd_mix_is_zero_at_silence() {
        assert_eq!(mix_tnd(0.0, 0), 0.0);
        assert!(mix_tnd(15.0, 15) > 0.0);
        assert!(mix_tnd(15.0, 15) < 1.0);
    }
}
