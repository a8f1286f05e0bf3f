use crate::error::SolverError;
use crate::grid::{DEFAULT_DELTA, DEFAULT_ITERATIONS, DEFAULT_N, DEFAULT_THREADS, cube};

/// ソルバーのスカラー設定。構築後は変更しない
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// 立方体の一辺。奇数であることは呼び出し側が保証する
    pub n: usize,
    pub iterations: usize,
    pub threads: usize,
    pub delta: f64,
    /// 診断ログの出し方だけに影響し、計算結果には影響しない
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            n: DEFAULT_N,
            iterations: DEFAULT_ITERATIONS,
            threads: DEFAULT_THREADS,
            delta: DEFAULT_DELTA,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn new(n: usize, iterations: usize, threads: usize, delta: f64) -> Self {
        SolverConfig {
            n,
            iterations,
            threads,
            delta,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn cells(&self) -> Result<usize, SolverError> {
        cube(self.n)
    }

    /// ワーカー起動前の検証。ソース長と n³ の一致も確認する
    pub fn validate(&self, source_len: usize) -> Result<(), SolverError> {
        if self.threads == 0 {
            return Err(SolverError::InvalidThreadCount(self.threads));
        }
        if self.n < 3 {
            return Err(SolverError::GridTooSmall(self.n));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(SolverError::InvalidDelta(self.delta));
        }
        let expected = self.cells()?;
        if source_len != expected {
            return Err(SolverError::SourceLengthMismatch {
                expected,
                actual: source_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SolverConfig::default();
        assert_eq!(config.n, 5);
        assert_eq!(config.validate(125), Ok(()));
    }

    #[test]
    fn rejects_bad_scalars() {
        assert_eq!(
            SolverConfig::new(5, 1, 0, 1.0).validate(125),
            Err(SolverError::InvalidThreadCount(0))
        );
        assert_eq!(
            SolverConfig::new(1, 1, 1, 1.0).validate(1),
            Err(SolverError::GridTooSmall(1))
        );
        assert_eq!(
            SolverConfig::new(5, 1, 1, 0.0).validate(125),
            Err(SolverError::InvalidDelta(0.0))
        );
        assert!(matches!(
            SolverConfig::new(5, 1, 1, f64::NAN).validate(125),
            Err(SolverError::InvalidDelta(_))
        ));
    }

    #[test]
    fn rejects_source_length_mismatch() {
        assert_eq!(
            SolverConfig::new(3, 1, 1, 1.0).validate(26),
            Err(SolverError::SourceLengthMismatch {
                expected: 27,
                actual: 26
            })
        );
    }
}
