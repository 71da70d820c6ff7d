//! End-to-end tests of the integer expression layer: arithmetic chains are decomposed into
//! auxiliary variables and solved by the integer search algorithms.

use std::time::Duration;

use gherkin_solver::IntBranchAndBound;
use gherkin_solver::IntervalDomain;
use gherkin_solver::IntForwardChecking;
use gherkin_solver::IntMinConflicts;
use gherkin_solver::IntProblem;
use gherkin_solver::IntProblemBuilder;
use gherkin_solver::Optimization;
use gherkin_solver::SearchAlgorithm;
use gherkin_solver::Solution;
use gherkin_solver::Solver;

fn base_values(problem: &IntProblem, solution: &Solution<i32>) -> Vec<i32> {
    (0..problem.original_variable_count())
        .map(|variable| *solution.value(variable))
        .collect()
}

fn all_base_solutions(problem: &IntProblem) -> Vec<Vec<i32>> {
    let mut algorithm = IntForwardChecking::new(problem);
    let mut solutions = Vec::new();
    loop {
        algorithm.step();
        if !algorithm.is_successful() {
            break;
        }
        assert!(problem.is_satisfied(algorithm.solution()));
        solutions.push(base_values(problem, algorithm.solution()));
    }
    solutions.sort();
    solutions
}

#[test]
fn products_are_decomposed_and_enumerated() {
    let mut builder =
        IntProblemBuilder::with_shared_domain("product", 2, IntervalDomain::range(1, 6));
    builder.constrain_var(0).multiplied_by_var(1).equals(12);
    let problem = builder.build();

    assert_eq!(
        all_base_solutions(&problem),
        vec![vec![2, 6], vec![3, 4], vec![4, 3], vec![6, 2]]
    );
}

#[test]
fn absolute_differences_constrain_pairs() {
    let mut builder =
        IntProblemBuilder::with_shared_domain("distance", 2, IntervalDomain::range(1, 4));
    builder.constrain_var(0).minus_var(1).abs().equals(2);
    let problem = builder.build();

    assert_eq!(
        all_base_solutions(&problem),
        vec![vec![1, 3], vec![2, 4], vec![3, 1], vec![4, 2]]
    );
}

#[test]
fn chains_combine_value_and_variable_operands() {
    // 2 * v0 + 1 == v1 over [0..9]^2.
    let mut builder =
        IntProblemBuilder::with_shared_domain("affine", 2, IntervalDomain::range(0, 9));
    builder
        .constrain_var(0)
        .multiplied_by(2)
        .plus(1)
        .equals_var(1);
    let problem = builder.build();

    assert_eq!(
        all_base_solutions(&problem),
        vec![
            vec![0, 1],
            vec![1, 3],
            vec![2, 5],
            vec![3, 7],
            vec![4, 9]
        ]
    );
}

#[test]
fn comparisons_between_two_chains_bind_their_tails() {
    // v0 + 2 < v1 - 1 over [0..5]^2.
    let mut builder =
        IntProblemBuilder::with_shared_domain("ordering", 2, IntervalDomain::range(0, 5));
    builder.constrain_var(0).plus(2).less_than_var(1).minus(1);
    let problem = builder.build();

    let solutions = all_base_solutions(&problem);
    assert!(!solutions.is_empty());
    for solution in &solutions {
        assert!(solution[0] + 2 < solution[1] - 1);
    }
}

#[test]
fn min_and_max_operators_follow_their_semantics() {
    // max(v0, 3) == v0 and min(v1, v0) == 2.
    let mut builder =
        IntProblemBuilder::with_shared_domain("extremes", 2, IntervalDomain::range(0, 5));
    builder.constrain_var(0).max_with(3).equals_var(0);
    builder.constrain_var(1).min_with_var(0).equals(2);
    let problem = builder.build();

    for solution in all_base_solutions(&problem) {
        assert!(solution[0] >= 3);
        assert_eq!(i32::min(solution[1], solution[0]), 2);
    }
}

#[test]
fn branch_and_bound_optimizes_over_an_expression_model() {
    // Maximize v0 + v1 subject to v0 * v1 <= 6.
    let mut builder =
        IntProblemBuilder::with_shared_domain("knapsack", 2, IntervalDomain::range(1, 5));
    builder.constrain_var(0).multiplied_by_var(1).less_or_equals(6);
    let problem = builder.build();

    let sum = |solution: &Solution<i32>, variable: usize, _: f64| {
        (0..=variable)
            .filter(|&index| solution.is_assigned(index))
            .map(|index| *solution.value(index) as f64)
            .sum::<f64>()
    };
    let mut algorithm =
        IntBranchAndBound::maximizing(&problem, move |s, v, score| sum(s, v, score) + 5.0, sum);

    let mut best = None;
    loop {
        algorithm.step();
        if !algorithm.is_successful() {
            break;
        }
        best = Some(algorithm.objective_value());
    }

    // The optimum is v0 = 1, v1 = 5 (or symmetric): sum 6.
    assert_eq!(best, Some(6.0));
}

#[test]
fn the_solver_drives_integer_algorithms_with_time_budgets() {
    let mut builder =
        IntProblemBuilder::with_shared_domain("budgeted", 2, IntervalDomain::range(0, 20));
    builder.constrain_var(0).plus_var(1).equals(20);
    let problem = builder.build();
    let mut solver = Solver::new(IntForwardChecking::new(&problem));

    let solutions: Vec<_> = solver
        .solutions_within(Duration::from_secs(5))
        .collect();
    assert_eq!(solutions.len(), 21);
    assert_eq!(solver.statistics().num_solutions, 21);
}

#[test]
fn min_conflicts_solves_an_expression_model() {
    let mut builder =
        IntProblemBuilder::with_shared_domain("local-search", 3, IntervalDomain::range(0, 9));
    // v0 + v1 == 9 and v1 - v2 == 3.
    builder.constrain_var(0).plus_var(1).equals(9);
    builder.constrain_var(1).minus_var(2).equals(3);
    let problem = builder.build();
    let mut algorithm = IntMinConflicts::global_optimum_of(&problem).with_seed(99);

    algorithm.step();
    assert!(algorithm.is_successful());
    let solution = algorithm.solution();
    assert!(problem.is_satisfied(solution));
    assert_eq!(*solution.value(0) + *solution.value(1), 9);
    assert_eq!(*solution.value(1) - *solution.value(2), 3);
}
