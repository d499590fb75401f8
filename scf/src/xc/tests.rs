use super::*;

fn energy_density(xc: &Xc, n: f64) -> f64 {
    let (exc, _) = xc.get_xc(&[DVector::from_element(1, n)]).unwrap();
    n * exc[0]
}

fn energy_density_spin(xc: &Xc, up: f64, dn: f64) -> f64 {
    let (exc, _) = xc
        .get_xc(&[DVector::from_element(1, up), DVector::from_element(1, dn)])
        .unwrap();
    (up + dn) * exc[0]
}

#[test]
fn test_parse_names() {
    let xc = Xc::parse("lda,vwn", UnknownXcPolicy::Warn).unwrap();
    assert_eq!(xc, Xc::default());
    assert_eq!(xc.to_string(), "lda,vwn");

    let xc = Xc::parse("LDA,", UnknownXcPolicy::Fatal).unwrap();
    assert_eq!(xc.exchange, ExchangeFunctional::Slater);
    assert_eq!(xc.correlation, CorrelationFunctional::Mock);

    let xc = Xc::parse(",", UnknownXcPolicy::Fatal).unwrap();
    assert!(xc.is_mock());
}

#[test]
fn test_unknown_functional_policy() {
    let xc = Xc::parse("pbe,vwn", UnknownXcPolicy::Warn).unwrap();
    assert_eq!(xc.exchange, ExchangeFunctional::Mock);
    assert_eq!(xc.correlation, CorrelationFunctional::Vwn);

    assert!(matches!(
        Xc::parse("lda,pw", UnknownXcPolicy::Fatal),
        Err(ScfError::UnknownFunctional(name)) if name == "pw"
    ));
    assert_eq!("fatal".parse::<UnknownXcPolicy>().unwrap(), UnknownXcPolicy::Fatal);
    assert!("maybe".parse::<UnknownXcPolicy>().is_err());
}

#[test]
fn test_slater_exchange_values() {
    let (ex, vx) = slater_x(1.0);
    assert!((ex + 0.7385587663820224).abs() < 1e-12);
    assert!((vx - 4.0 / 3.0 * ex).abs() < 1e-15);
}

#[test]
fn test_vwn_correlation_values() {
    // rs = 1
    let n = 3.0 / (4.0 * PI);
    let (ec, _) = vwn_c(n);
    assert!((ec + 0.0600).abs() < 5e-4, "ec = {}", ec);
    // rs = 10
    let n = 3.0 / (4.0 * PI * 1000.0);
    let (ec, _) = vwn_c(n);
    assert!((ec + 0.0186).abs() < 5e-4, "ec = {}", ec);
}

#[test]
fn test_potential_is_density_derivative() {
    let xc = Xc::default();
    for &n in &[1e-3, 0.05, 0.4, 2.5] {
        let h = n * 1e-5;
        let numeric = (energy_density(&xc, n + h) - energy_density(&xc, n - h)) / (2.0 * h);
        let (_, vxc) = xc.get_xc(&[DVector::from_element(1, n)]).unwrap();
        assert!(
            (numeric - vxc[0][0]).abs() < 1e-6 * vxc[0][0].abs().max(1.0),
            "n = {}: {} vs {}",
            n,
            numeric,
            vxc[0][0]
        );
    }
}

#[test]
fn test_polarized_potential_is_density_derivative() {
    let xc = Xc::default();
    for &(up, dn) in &[(0.3, 0.1), (0.02, 0.05), (0.5, 0.5)] {
        let (_, vxc) = xc
            .get_xc(&[DVector::from_element(1, up), DVector::from_element(1, dn)])
            .unwrap();
        let h = 1e-6;
        let dup = (energy_density_spin(&xc, up + h, dn) - energy_density_spin(&xc, up - h, dn))
            / (2.0 * h);
        let ddn = (energy_density_spin(&xc, up, dn + h) - energy_density_spin(&xc, up, dn - h))
            / (2.0 * h);
        assert!((dup - vxc[0][0]).abs() < 1e-6, "up: {} vs {}", dup, vxc[0][0]);
        assert!((ddn - vxc[1][0]).abs() < 1e-6, "down: {} vs {}", ddn, vxc[1][0]);
    }
}

#[test]
fn test_polarized_matches_unpolarized_for_equal_spins() {
    let xc = Xc::default();
    let n = DVector::from_vec(vec![1e-4, 0.01, 0.3, 1.7]);
    let half = n.map(|v| v / 2.0);
    let (exc, vxc) = xc.get_xc(&[n.clone()]).unwrap();
    let (exc_s, vxc_s) = xc.get_xc(&[half.clone(), half]).unwrap();
    for i in 0..n.len() {
        assert!((exc[i] - exc_s[i]).abs() < 1e-12);
        assert!((vxc[0][i] - vxc_s[0][i]).abs() < 1e-12);
        assert!((vxc[0][i] - vxc_s[1][i]).abs() < 1e-12);
    }
}

#[test]
fn test_low_density_guard() {
    let xc = Xc::default();
    let n = DVector::from_vec(vec![0.0, 1e-31, -1e-20]);
    let (exc, vxc) = xc.get_xc(&[n.clone()]).unwrap();
    assert!(exc.iter().all(|&v| v == 0.0));
    assert!(vxc[0].iter().all(|&v| v == 0.0));
    let (exc, vxc) = xc.get_xc(&[n.clone(), n]).unwrap();
    assert!(exc.iter().all(|&v| v == 0.0));
    assert!(vxc.iter().all(|v| v.iter().all(|&x| x == 0.0)));
}

#[test]
fn test_invalid_density_is_error() {
    let xc = Xc::default();
    let n = DVector::from_vec(vec![0.1, f64::NAN]);
    assert!(matches!(xc.get_xc(&[n]), Err(ScfError::Functional(_))));
    assert!(xc.get_xc(&[]).is_err());
}
