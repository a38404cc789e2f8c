/// First-order decomposition kinetics, `[A](t) = A0 * exp(-k * t)`, sampled on a uniform time grid.
/// Independent from the Chemistry module; the two only share the package.
pub mod decomposition;
