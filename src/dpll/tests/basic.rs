use dpll::{
    dimacs, BasicCallbacks, BasicSimpSolver, BasicSolver, LBool, Lit, SimpOpts, SimpSolver,
    SolverInterface, SolverOpts,
};

/// Small deterministic generator, so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as u32
    }
}

fn random_3sat(seed: u64, num_vars: u32, num_clauses: usize) -> Vec<Vec<i32>> {
    let mut rng = Lcg(seed);
    (0..num_clauses)
        .map(|_| {
            let mut c: Vec<i32> = vec![];
            while c.len() < 3 {
                let v = rng.next(num_vars) as i32 + 1;
                if c.iter().any(|x| x.abs() == v) {
                    continue;
                }
                c.push(if rng.next(2) == 0 { v } else { -v });
            }
            c
        })
        .collect()
}

fn load<S: SolverInterface>(s: &mut S, clauses: &[Vec<i32>]) -> bool {
    let mut ok = true;
    for c in clauses {
        let lits: Vec<Lit> = c
            .iter()
            .map(|&i| Lit::new(s.var_of_int(i.unsigned_abs()), i > 0))
            .collect();
        ok &= s.add_clause(&lits);
    }
    ok
}

fn check_model<S: SolverInterface>(s: &S, clauses: &[Vec<i32>]) {
    for c in clauses {
        assert!(
            c.iter()
                .any(|&i| s.value_lit(Lit::from_dimacs(i)) == LBool::TRUE),
            "clause {:?} is not satisfied by the model",
            c
        );
    }
}

/// Pigeons `0..n+1` in holes `0..n`.
fn pigeonhole(n: i32) -> Vec<Vec<i32>> {
    let var = |p: i32, h: i32| p * n + h + 1;
    let mut cs = vec![];
    for p in 0..=n {
        cs.push((0..n).map(|h| var(p, h)).collect());
    }
    for h in 0..n {
        for p in 0..=n {
            for q in p + 1..=n {
                cs.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    cs
}

#[test]
fn unit_clause_is_sat() {
    let mut s = BasicSolver::default();
    dimacs::parse(&mut "p cnf 3 1\n-1 0\n".as_bytes(), &mut s, true).unwrap();
    assert_eq!(s.num_vars(), 3);
    assert_eq!(s.solve_limited(&[]), LBool::TRUE);
    assert_eq!(s.value_lit(Lit::from_dimacs(1)), LBool::FALSE);
    assert_eq!(s.value_lit(Lit::from_dimacs(-1)), LBool::TRUE);
}

#[test]
fn contradicting_units_are_unsat() {
    let mut s = BasicSolver::default();
    dimacs::parse(&mut "p cnf 2 2\n1 0\n-1 0\n".as_bytes(), &mut s, true).unwrap();
    assert!(!s.is_ok());
    assert_eq!(s.solve_limited(&[]), LBool::FALSE);
    assert!(!s.is_ok());
    assert!(!s.add_clause(&[Lit::from_dimacs(2)]));
}

#[test]
fn parse_strict_mismatch() {
    let mut s = BasicSolver::default();
    let r = dimacs::parse(&mut "p cnf 2 1\n1 0\n2 0\n".as_bytes(), &mut s, true);
    assert!(matches!(r, Err(dimacs::Error::TooManyClauses)));

    let mut s = BasicSolver::default();
    let r = dimacs::parse(&mut "p cnf 2 3\n1 0\n2 0\n".as_bytes(), &mut s, false);
    assert!(r.is_ok());
    assert!(s.solve(&[]));
}

#[test]
fn parse_strict_rejects_undeclared_vars() {
    let mut s = BasicSolver::default();
    let r = dimacs::parse(&mut "p cnf 2 1\n5 0\n".as_bytes(), &mut s, true);
    assert!(matches!(r, Err(dimacs::Error::VarOutOfRange(5))));
    assert_eq!(s.num_vars(), 2);

    let mut s = BasicSolver::default();
    let r = dimacs::parse(&mut "p cnf 3 2\n1 -2 0\n2\n -4 0\n".as_bytes(), &mut s, true);
    assert!(matches!(r, Err(dimacs::Error::VarOutOfRange(-4))));

    // without the header bound, variables are created on demand
    let mut s = BasicSolver::default();
    dimacs::parse(&mut "p cnf 2 1\n5 0\n".as_bytes(), &mut s, false).unwrap();
    assert_eq!(s.num_vars(), 5);
    assert!(s.solve(&[]));
}

#[test]
fn pigeonhole_is_unsat() {
    let cs = pigeonhole(4);
    let mut s = BasicSolver::default();
    assert!(load(&mut s, &cs));
    assert!(!s.solve(&[]));
    assert!(s.num_conflicts() > 0);

    let mut s = BasicSimpSolver::default();
    assert!(load(&mut s, &cs));
    assert!(!s.solve(&[]));
}

#[test]
fn pigeonhole_fits() {
    // n pigeons in n holes
    let n = 5;
    let var = |p: i32, h: i32| p * n + h + 1;
    let mut cs: Vec<Vec<i32>> = vec![];
    for p in 0..n {
        cs.push((0..n).map(|h| var(p, h)).collect());
    }
    for h in 0..n {
        for p in 0..n {
            for q in p + 1..n {
                cs.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    let mut s = BasicSimpSolver::default();
    assert!(load(&mut s, &cs));
    assert!(s.solve(&[]));
    check_model(&s, &cs);
}

#[test]
fn random_3sat_agrees_with_and_without_preprocessing() {
    let mut n_sat = 0;
    for seed in 0..30 {
        let cs = random_3sat(seed, 40, 170);

        let mut plain = BasicSolver::default();
        let plain_ok = load(&mut plain, &cs);
        let r1 = if plain_ok { plain.solve_limited(&[]) } else { LBool::FALSE };

        let mut simp = BasicSimpSolver::default();
        let simp_ok = load(&mut simp, &cs);
        let r2 = if simp_ok { simp.solve_limited(&[]) } else { LBool::FALSE };

        assert_eq!(r1, r2, "seed {}", seed);
        if r1 == LBool::TRUE {
            n_sat += 1;
            check_model(&plain, &cs);
            check_model(&simp, &cs);
        } else {
            assert_eq!(r1, LBool::FALSE);
        }
    }
    // the ratio is close to the threshold: expect both outcomes
    assert!(n_sat > 0);
}

#[test]
fn random_3sat_all_options() {
    let opts = SimpOpts {
        use_asymm: true,
        use_rcheck: true,
        grow: 2,
        clause_lim: -1,
        ..SimpOpts::default()
    };
    let core_opts = SolverOpts {
        random_var_freq: 0.05,
        luby_restart: false,
        rnd_init_act: true,
        ..SolverOpts::default()
    };
    for seed in 100..110 {
        let cs = random_3sat(seed, 30, 120);
        let mut reference = BasicSolver::default();
        let expected = if load(&mut reference, &cs) {
            reference.solve_limited(&[])
        } else {
            LBool::FALSE
        };

        let mut s: SimpSolver<BasicCallbacks> =
            SimpSolver::new(core_opts.clone(), opts.clone(), BasicCallbacks::new());
        let res = if load(&mut s, &cs) {
            s.solve_limited(&[])
        } else {
            LBool::FALSE
        };
        assert_eq!(res, expected, "seed {}", seed);
        if res == LBool::TRUE {
            check_model(&s, &cs);
        }
    }
}

#[test]
fn dimacs_round_trip_through_solver() {
    let cs = random_3sat(7, 10, 20);
    let p = dimacs::Problem {
        num_vars: 10,
        clauses: cs.clone(),
    };
    let mut out = vec![];
    dimacs::encode_problem(&mut out, &p).unwrap();
    let p2 = dimacs::Problem::decode(&out[..]).unwrap();
    assert_eq!(p, p2);

    let mut s = BasicSolver::default();
    assert!(p2.add_to(&mut s));
    assert_eq!(s.num_vars(), 10);
    let mut s2 = BasicSolver::default();
    dimacs::parse(&mut &out[..], &mut s2, true).unwrap();
    assert_eq!(s.solve(&[]), s2.solve(&[]));
}

#[test]
fn incremental_solving() {
    let mut s = BasicSimpSolver::default();
    let cs = vec![vec![1, 2, 3], vec![-1, 2], vec![-2, 3]];
    // keep every variable, clauses are added between calls
    for i in 1..=3 {
        let v = s.var_of_int(i);
        s.freeze(v);
    }
    assert!(load(&mut s, &cs));
    assert!(s.solve(&[]));
    check_model(&s, &cs);

    // propagates to a conflict at level 0
    assert!(!s.add_clause(&[Lit::from_dimacs(-3)]));
    assert!(!s.solve(&[]));
    assert!(!s.is_ok());
}
