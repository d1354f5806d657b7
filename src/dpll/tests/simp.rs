use dpll::{BasicCallbacks, LBool, Lit, SimpOpts, SimpSolver, SolverInterface, SolverOpts, Var};

type S = SimpSolver<BasicCallbacks>;

fn new_solver(opts: SimpOpts) -> S {
    SimpSolver::new(SolverOpts::default(), opts, BasicCallbacks::new())
}

fn add_all(s: &mut S, clauses: &[Vec<i32>]) {
    for c in clauses {
        let lits: Vec<Lit> = c
            .iter()
            .map(|&i| Lit::new(s.var_of_int(i.unsigned_abs()), i > 0))
            .collect();
        assert!(s.add_clause(&lits));
    }
}

fn satisfied(s: &S, clauses: &[Vec<i32>]) -> bool {
    clauses.iter().all(|c| {
        c.iter()
            .any(|&i| s.value_lit(Lit::from_dimacs(i)) == LBool::TRUE)
    })
}

/// x_i <-> x_{i+1} along a chain, plus a few side clauses.
fn equivalence_chain(n: i32) -> Vec<Vec<i32>> {
    let mut cs = vec![];
    for i in 1..n {
        cs.push(vec![-i, i + 1]);
        cs.push(vec![i, -(i + 1)]);
    }
    cs.push(vec![1, n + 1]);
    cs.push(vec![-(n + 1), -n, n + 2]);
    cs
}

#[test]
fn elimination_then_model_extension() {
    let cs = equivalence_chain(12);
    let mut s = new_solver(SimpOpts::default());
    add_all(&mut s, &cs);
    assert!(s.eliminate(true));
    assert!(s.num_eliminated_vars() > 0);
    assert!(s.num_clauses() < cs.len() as u64);
    assert!(s.solve(&[]));
    assert!(satisfied(&s, &cs));

    // every variable got a value, eliminated or not
    for i in 1..=s.num_vars() {
        assert_ne!(s.value_var(Var::new(i)), LBool::UNDEF, "var {}", i);
    }
}

#[test]
fn elimination_without_model_extension() {
    let cs = equivalence_chain(6);
    let opts = SimpOpts {
        extend_model: false,
        ..SimpOpts::default()
    };
    let mut s = new_solver(opts);
    add_all(&mut s, &cs);
    assert!(s.solve(&[]));
    let elim: Vec<Var> = (1..=s.num_vars())
        .map(Var::new)
        .filter(|&v| s.is_eliminated(v))
        .collect();
    assert!(!elim.is_empty());
    for v in elim {
        assert_eq!(s.value_var(v), LBool::UNDEF);
    }
}

#[test]
fn frozen_variables_survive() {
    let cs = equivalence_chain(8);
    let mut s = new_solver(SimpOpts::default());
    add_all(&mut s, &cs);
    let (a, b) = (Var::new(1), Var::new(8));
    s.freeze(a);
    s.freeze(b);
    assert!(s.eliminate(false));
    assert!(!s.is_eliminated(a));
    assert!(!s.is_eliminated(b));
    assert!(s.use_simplification());

    // new clauses over frozen variables are still accepted
    assert!(s.add_clause(&[Lit::new(a, true)]));
    assert!(s.solve(&[]));
    assert_eq!(s.value_var(b), LBool::TRUE);
    assert!(satisfied(&s, &cs));

    // `b` is already true at level 0
    assert!(!s.add_clause(&[Lit::new(b, false)]));
    assert!(!s.solve(&[]));
}

#[test]
fn preprocessing_disabled() {
    let cs = equivalence_chain(8);
    let mut s = new_solver(SimpOpts::default());
    assert!(s.eliminate(true));
    assert!(!s.use_simplification());
    add_all(&mut s, &cs);
    assert!(s.solve(&[]));
    assert_eq!(s.num_eliminated_vars(), 0);
    assert!(satisfied(&s, &cs));
}

#[test]
fn unsat_found_by_preprocessing() {
    let cs = vec![vec![1, 2], vec![1, -2], vec![-1, 3], vec![-1, -3]];
    let mut s = new_solver(SimpOpts::default());
    add_all(&mut s, &cs);
    assert!(!s.eliminate(true));
    assert!(!s.is_ok());
    assert_eq!(s.solve_limited(&[]), LBool::FALSE);
    assert!(s.get_model().is_empty());
}

#[test]
fn interrupted_solver_returns_undef() {
    let cs = equivalence_chain(10);
    let mut s = new_solver(SimpOpts::default());
    add_all(&mut s, &cs);
    s.interrupt();
    // preprocessing stops early, search does not start
    assert_eq!(s.solve_limited(&[]), LBool::UNDEF);
    s.clear_interrupt();
    assert_eq!(s.solve_limited(&[]), LBool::TRUE);
    assert!(satisfied(&s, &cs));
}
