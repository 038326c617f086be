//! Brent's root-finding algorithm with outward bracket search.

use crate::error::{MathError, MathResult};
use crate::solvers::{Bracket, Evaluator, RootFinder, SolverConfig, SolverResult};

/// Brent's method preceded by a geometric bracket search.
///
/// Starting from the guess, the solver samples one step to the side, then
/// grows whichever end has the smaller `|f|` by `growth` times the current
/// width until the signs differ. Samples are clamped to the supplied
/// [`Bracket`]; once both ends sit on its bounds without a sign change the
/// search fails with `MathError::InvalidBracket`.
///
/// Converges when `|f(x)| <= tolerance` or when the bracket has collapsed to
/// machine precision around the root.
///
/// # Example
///
/// ```rust
/// use pillar_math::solvers::{Bracket, Brent, RootFinder, SolverConfig};
///
/// // Discount factor implied by a 5% continuously compounded one-year rate
/// let f = |df: f64| -df.ln() - 0.05;
/// let bracket = Bracket::new(1e-6, 1.5).unwrap();
/// let result = Brent::default()
///     .find_root(&f, 1.0, bracket, &SolverConfig::default())
///     .unwrap();
/// assert!((result.root - (-0.05f64).exp()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brent {
    /// Expansion factor applied to the bracket width during the search.
    pub growth: f64,
    /// First sample distance as a fraction of the bracket width.
    pub step_fraction: f64,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            growth: 1.6,
            step_fraction: 0.01,
        }
    }
}

impl Brent {
    /// Creates a solver with the given growth factor and initial step fraction.
    #[must_use]
    pub fn new(growth: f64, step_fraction: f64) -> Self {
        Self {
            growth,
            step_fraction,
        }
    }

    fn converged(x: f64, fx: f64, ev: &Evaluator<'_>, iterations: u32) -> SolverResult {
        log::debug!(
            "brent converged: x = {x}, f(x) = {fx:.3e}, {} evaluations",
            ev.count
        );
        SolverResult {
            root: x,
            iterations,
            residual: fx,
            evaluations: ev.count,
        }
    }

    /// Brent's method on a bracket with a sign change.
    fn solve_bracketed(
        ev: &mut Evaluator<'_>,
        mut a: f64,
        mut fa: f64,
        mut b: f64,
        mut fb: f64,
        tolerance: f64,
    ) -> MathResult<SolverResult> {
        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;
        let mut iterations = 0;

        loop {
            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol1 = 2.0 * f64::EPSILON * b.abs() + f64::MIN_POSITIVE;
            let xm = 0.5 * (c - b);

            if fb.abs() <= tolerance || xm.abs() <= tol1 {
                return Ok(Self::converged(b, fb, ev, iterations));
            }
            if ev.exhausted() {
                return Err(MathError::convergence_failed(ev.count, fb.abs()));
            }

            if e.abs() >= tol1 && fa.abs() > fb.abs() {
                // Inverse quadratic interpolation, or secant when only two points differ
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol1 * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
            fb = ev.eval(b)?;
            iterations += 1;
        }
    }
}

impl RootFinder for Brent {
    fn find_root(
        &self,
        f: &dyn Fn(f64) -> f64,
        guess: f64,
        bracket: Bracket,
        config: &SolverConfig,
    ) -> MathResult<SolverResult> {
        let mut ev = Evaluator::new(f, config.max_evaluations.max(2));
        let tolerance = config.tolerance;

        let root = if guess.is_finite() {
            bracket.clamp(guess)
        } else {
            bracket.midpoint()
        };
        let f_root = ev.eval(root)?;
        if f_root.abs() <= tolerance {
            return Ok(Self::converged(root, f_root, &ev, 0));
        }

        let step = (bracket.width() * self.step_fraction).max(f64::EPSILON);
        let (mut a, mut fa, mut b, mut fb) = if root - step < bracket.lower {
            let b = bracket.clamp(root + step);
            (root, f_root, b, ev.eval(b)?)
        } else {
            let a = root - step;
            (a, ev.eval(a)?, root, f_root)
        };

        loop {
            if fa.abs() <= tolerance {
                return Ok(Self::converged(a, fa, &ev, 0));
            }
            if fb.abs() <= tolerance {
                return Ok(Self::converged(b, fb, &ev, 0));
            }
            if fa * fb < 0.0 {
                log::trace!("brent bracketed root in [{a}, {b}] after {} evaluations", ev.count);
                return Self::solve_bracketed(&mut ev, a, fa, b, fb, tolerance);
            }
            if a <= bracket.lower && b >= bracket.upper {
                return Err(MathError::InvalidBracket { a, b, fa, fb });
            }
            if ev.exhausted() {
                return Err(MathError::convergence_failed(ev.count, fa.abs().min(fb.abs())));
            }

            let expand_lower = if a <= bracket.lower {
                false
            } else if b >= bracket.upper {
                true
            } else {
                fa.abs() < fb.abs()
            };
            if expand_lower {
                a = bracket.clamp(a + self.growth * (a - b));
                fa = ev.eval(a)?;
            } else {
                b = bracket.clamp(b + self.growth * (b - a));
                fb = ev.eval(b)?;
            }
        }
    }

    fn name(&self) -> &'static str {
        "Brent"
    }
}
