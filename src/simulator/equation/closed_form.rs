use crate::error::DosingError;
use crate::simulator::equation::{Analytical, Integrator, System};
use crate::simulator::{AnalyticalEq, TaskMode, T, V};

/// Advances the state with a closed-form solution, see [crate::simulator::models]
#[derive(Debug, Clone)]
pub struct ClosedForm {
    eq: AnalyticalEq,
    p: V,
}

impl ClosedForm {
    pub fn new(eq: AnalyticalEq, p: Vec<f64>) -> Self {
        ClosedForm {
            eq,
            p: V::from_vec(p),
        }
    }

    pub fn params(&self) -> &V {
        &self.p
    }
}

impl Integrator for ClosedForm {
    fn integrate(
        &self,
        x: &V,
        rateiv: &V,
        tfrom: T,
        tto: T,
        _mode: TaskMode,
    ) -> Result<V, DosingError> {
        Ok((self.eq)(x, &self.p, tto - tfrom, rateiv))
    }
}

impl Analytical {
    /// A closed-form system with `neq` compartments
    ///
    /// # Arguments
    ///
    /// * `eq` - The solution over an interval, see [AnalyticalEq]
    /// * `p` - Model parameters passed to `eq`
    /// * `neq` - Number of compartments
    pub fn new(eq: AnalyticalEq, p: Vec<f64>, neq: usize) -> Self {
        System::with_integrator(ClosedForm::new(eq, p), neq)
    }
}
