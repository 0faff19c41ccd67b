//! Tests scientifiques (campagne) : propriétés numériques des deux estimateurs.
//!
//! But : vérifier les invariants annoncés sans faire chauffer la machine.
//! - budget temps global
//! - tranches et profondeurs bornées
//!
//! Notes :
//! - La convergence de la grille fixe est testée contre le Simpson adaptatif
//!   (tolérance fine), pas contre une primitive symbolique.
//! - Le “1/x sur [-1, 1]” n’échoue que si un milieu tombe exactement sur 0 :
//!   on prend des n impairs où a + (i + 1/2)·dx vaut 0 en flottant.

use std::f64::consts::PI;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::{adaptive_volume, compile, fixed_grid_volume, Domain, PROFONDEUR_DEFAUT};

fn n(k: usize) -> NonZeroUsize {
    NonZeroUsize::new(k).unwrap_or(NonZeroUsize::MIN)
}

fn d(a: f64, b: f64) -> Domain {
    Domain::new(a, b).unwrap_or_else(|e| panic!("{e}"))
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Constantes : exactitude ------------------------ */

#[test]
fn sci_constante_exacte_deux_estimateurs() {
    for (c, a, b) in [(0.0, 0.0, 1.0), (2.0, -1.0, 3.0), (-0.75, 0.5, 2.5), (10.0, -10.0, 10.0)] {
        let f = compile(&format!("{c}")).unwrap();
        let dom = d(a, b);
        let exact = PI * c * c * (b - a);

        for k in [1, 2, 7, 12, 240] {
            let g = fixed_grid_volume(&f, dom, n(k)).unwrap();
            assert_relative_eq!(g.volume(), exact, epsilon = 1e-12, max_relative = 1e-12);
        }
        for tol in [0.05, 0.005, 1e-6] {
            let r = adaptive_volume(&f, dom, tol, PROFONDEUR_DEFAUT).unwrap();
            assert_relative_eq!(r.volume(), exact, epsilon = 1e-12, max_relative = 1e-12);
        }
    }
}

/* ------------------------ Convergence grille fixe -> adaptatif ------------------------ */

#[test]
fn sci_convergence_bol_quadratique() {
    let f = compile("(x-1)^2 + 0.5").unwrap();
    let dom = d(0.0, 2.0);
    let reference = adaptive_volume(&f, dom, 1e-9, PROFONDEUR_DEFAUT).unwrap().volume();

    let mut precedent = f64::INFINITY;
    for k in [12, 24, 48, 96] {
        let v = fixed_grid_volume(&f, dom, n(k)).unwrap().volume();
        let ecart = (v - reference).abs();
        assert!(ecart < precedent, "k={k}: écart {ecart} >= {precedent}");
        precedent = ecart;
    }
}

#[test]
fn sci_bol_quadratique_valeur_exacte() {
    // π ∫₀² ((x-1)² + 1/2)² dx = π (2/5 + 2/3 + 1/2)
    let f = compile("(x - 1)^2 + 0.5").unwrap();
    let exact = PI * (0.4 + 2.0 / 3.0 + 0.5);
    let r = adaptive_volume(&f, d(0.0, 2.0), 0.005, PROFONDEUR_DEFAUT).unwrap();
    // polynôme de degré 4 : Richardson est exact
    assert_abs_diff_eq!(r.volume(), exact, epsilon = 1e-9);
}

/* ------------------------ Scénarios de référence ------------------------ */

#[test]
fn sci_sinus_decale() {
    let f = compile("sin(x) + 1.25").unwrap();
    let dom = d(0.0, PI);
    let exact = PI * (PI / 2.0 + 5.0 + 1.5625 * PI);

    let r = adaptive_volume(&f, dom, 0.01, PROFONDEUR_DEFAUT).unwrap();
    assert_abs_diff_eq!(r.volume(), exact, epsilon = 0.02);
    assert!((1..=1 << 12).contains(&r.intervals().len()));

    // recommandation : plancher 12
    assert!(r.recommended_slices() >= 12);
}

#[test]
fn sci_arc_exponentiel() {
    // π ∫₀² 0.36 e^x dx = 0.36 π (e² - 1)
    let f = compile("0.6*e^(0.5*x)").unwrap();
    let exact = 0.36 * PI * (2f64.exp() - 1.0);
    let r = adaptive_volume(&f, d(0.0, 2.0), 1e-6, PROFONDEUR_DEFAUT).unwrap();
    assert_relative_eq!(r.volume(), exact, max_relative = 1e-6);

    let g = fixed_grid_volume(&f, d(0.0, 2.0), n(240)).unwrap();
    assert_relative_eq!(g.volume(), exact, max_relative = 1e-4);
}

#[test]
fn sci_tolerance_plus_fine_plus_d_intervalles() {
    let f = compile("sqrt(x) + sin(3*x)").unwrap();
    let dom = d(0.0, 3.0);
    let grossier = adaptive_volume(&f, dom, 0.05, PROFONDEUR_DEFAUT).unwrap();
    let fin = adaptive_volume(&f, dom, 0.0005, PROFONDEUR_DEFAUT).unwrap();
    assert!(fin.intervals().len() >= grossier.intervals().len());
    assert!(fin.evaluations() >= grossier.evaluations());
}

/* ------------------------ Pavage ------------------------ */

#[test]
fn sci_pavage_toujours_exact() {
    let t0 = Instant::now();

    let cas = [
        ("x^2", 0.0, 2.0),
        ("abs(x - 0.3)", -1.0, 1.0),
        ("tanh(20*x)", -2.0, 2.0),
        ("1/(1 + 25*x^2)", -1.0, 1.0),
        ("log(x)", 0.1, 5.0),
        ("x % 1", 0.0, 3.3),
    ];
    for (s, a, b) in cas {
        let f = compile(s).unwrap();
        let dom = d(a, b);
        for tol in [0.05, 0.001, 1e-7] {
            budget(t0, Duration::from_secs(20));
            let r = adaptive_volume(&f, dom, tol, PROFONDEUR_DEFAUT).unwrap();
            let iv = r.intervals();
            assert_eq!(iv[0].start, a, "{s}");
            assert_eq!(iv[iv.len() - 1].end, b, "{s}");
            for w in iv.windows(2) {
                assert_eq!(w[0].end, w[1].start, "{s} tol={tol}");
                assert!(w[0].start < w[0].end);
            }
        }
    }
}

/* ------------------------ Grammaire ------------------------ */

#[test]
fn sci_grammaire_rejets_et_acceptation() {
    let rejets = [
        "os.system('x')",
        "x; y",
        "lambda x: x",
        "foo(x)",
        "sin",
        "x(2)",
        "max(x, 1)",
        "x // 2",
    ];
    for s in rejets {
        assert!(compile(s).is_err(), "{s:?} devrait être rejeté");
    }

    let h = compile("sin(x)^2 + 0.6*e^(0.5*x)").unwrap();
    let x = 0.7_f64;
    assert_abs_diff_eq!(
        h.eval(x).unwrap(),
        x.sin().powi(2) + 0.6 * (0.5 * x).exp(),
        epsilon = 1e-12
    );
}

#[test]
fn sci_scenario_x_carre() {
    let f = compile("x^2").unwrap();
    let g = fixed_grid_volume(&f, d(0.0, 2.0), n(4)).unwrap();
    let somme: f64 = [0.0625_f64, 0.5625, 1.5625, 3.0625].iter().map(|r| r * r).sum();
    assert_abs_diff_eq!(g.volume(), PI * 0.5 * somme, epsilon = 1e-12);
    assert_abs_diff_eq!(g.volume(), 19.0704, epsilon = 1e-3);
}

/* ------------------------ Propagation des échecs ------------------------ */

#[test]
fn sci_un_sur_x_echoue() {
    let f = compile("1/x").unwrap();
    let dom = d(-1.0, 1.0);
    for k in [1, 5] {
        let e = fixed_grid_volume(&f, dom, n(k)).unwrap_err();
        assert_eq!(e.cause, "division par zéro", "k={k}");
    }
    // l’adaptatif échantillonne le milieu du domaine dès le départ
    assert!(adaptive_volume(&f, dom, 0.01, PROFONDEUR_DEFAUT).is_err());
}

#[test]
fn sci_racine_negative_echoue() {
    let f = compile("sqrt(x)").unwrap();
    let dom = d(-0.5, 1.0);
    assert!(fixed_grid_volume(&f, dom, n(12)).is_err());
    assert!(adaptive_volume(&f, dom, 0.01, PROFONDEUR_DEFAUT).is_err());
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_profondeur_limite() {
    // oscillation rapide + tolérance minuscule : borné par la profondeur
    let t0 = Instant::now();
    let f = compile("sin(50*x)^2").unwrap();
    let r = adaptive_volume(&f, d(0.0, 10.0), 1e-12, PROFONDEUR_DEFAUT).unwrap();
    assert!(r.intervals().len() <= 1 << PROFONDEUR_DEFAUT);
    assert!(r.evaluations() <= 3 + 2 * ((1 << (PROFONDEUR_DEFAUT + 1)) - 1));
    budget(t0, Duration::from_secs(5));
}
