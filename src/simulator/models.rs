//! Closed-form solutions for common compartmental models
//!
//! Each function advances the state `x` over an interval of length `t` under
//! constant input rates `rateiv`, and has the [crate::simulator::AnalyticalEq]
//! signature.

use crate::simulator::{T, V};

/// Analytical solution for one compartment model.
///
/// # Assumptions
/// - `p` is a vector of length 1 with the value of the elimination constant
/// - `rateiv` is a vector of length 1 with the value of the infusion rate (only one drug)
/// - `x` is a vector of length 1
pub fn one_compartment(x: &V, p: &V, t: T, rateiv: &V) -> V {
    let mut xout = x.clone();
    let ke = p[0];

    xout[0] = x[0] * (-ke * t).exp() + rateiv[0] / ke * (1.0 - (-ke * t).exp());
    xout
}

/// Analytical solution for one compartment model with first-order absorption.
///
/// # Assumptions
/// - `p` is a vector of length 2 with ka and ke in that order
/// - `rateiv` is a vector of length 2, the infusion rates into depot and central
/// - `x` is a vector of length 2
pub fn one_compartment_with_absorption(x: &V, p: &V, t: T, rateiv: &V) -> V {
    let mut xout = x.clone();
    let ka = p[0];
    let ke = p[1];

    xout[0] = x[0] * (-ka * t).exp() + rateiv[0] / ka * (1.0 - (-ka * t).exp());

    // the depot infusion enters central like a continuous series of boluses
    let depot_input = rateiv[0] / ke * (1.0 - (-ke * t).exp())
        - rateiv[0] / (ka - ke) * ((-ke * t).exp() - (-ka * t).exp());

    xout[1] = x[1] * (-ke * t).exp()
        + rateiv[1] / ke * (1.0 - (-ke * t).exp())
        + ((ka * x[0]) / (ka - ke)) * ((-ke * t).exp() - (-ka * t).exp())
        + depot_input;

    xout
}

/// Analytical solution for two compartment model.
///
/// # Assumptions
/// - `p` is a vector of length 3 with ke, kcp and kpc in that order
/// - `rateiv` is a vector of length 2, only the central rate is used
/// - `x` is a vector of length 2 (central, peripheral)
pub fn two_compartments(x: &V, p: &V, t: T, rateiv: &V) -> V {
    let ke = p[0];
    let kcp = p[1];
    let kpc = p[2];

    let disc = ((ke + kcp + kpc).powi(2) - 4.0 * ke * kpc).max(0.0).sqrt();
    let l1 = (ke + kcp + kpc + disc) / 2.0;
    let l2 = (ke + kcp + kpc - disc) / 2.0;
    let e1 = (-l1 * t).exp();
    let e2 = (-l2 * t).exp();

    let central = ((l1 - kpc) * e1 + (kpc - l2) * e2) * x[0] + (-kpc * e1 + kpc * e2) * x[1];
    let peripheral =
        (-kcp * e1 + kcp * e2) * x[0] + ((l1 - ke - kcp) * e1 + (ke + kcp - l2) * e2) * x[1];

    let inf_central = ((l1 - kpc) / l1) * (1.0 - e1) + ((kpc - l2) / l2) * (1.0 - e2);
    let inf_peripheral = (-kcp / l1) * (1.0 - e1) + (kcp / l2) * (1.0 - e2);

    let mut xout = x.clone();
    xout[0] = (central + inf_central * rateiv[0]) / (l1 - l2);
    xout[1] = (peripheral + inf_peripheral * rateiv[0]) / (l1 - l2);
    xout
}
