use super::{
    CancellationToken, Objective, ObjectiveError, OptimizationStrategy, StrategyError,
    StrategyState,
};
use nalgebra::{DMatrix, RealField, Scalar};
use tracing::{debug, warn};

mod coord;
pub use coord::Coord;


/// number of vertices of the simplex
pub const POPULATION_SIZE: usize = 3;

/// a vertex of the simplex together with the objective value at its position
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// objective value at the position
    pub value: ScalarType,
    /// position of the vertex
    pub coord: Coord<ScalarType>,
}

/// A Nelder-Mead style simplex search with a population of exactly three vertices.
///
/// The vertices are kept ordered by ascending objective value as best, middle and
/// worst. Every iteration replaces the worst vertex by reflecting it through the
/// centroid `$\vec{c}$` of the other two, with the step `$\vec{d} = \vec{c} - \vec{x}_{worst}$`:
///
/// * reflection `$\vec{x}_{worst} + 2\vec{d}$` is accepted if its value lies between
///   best and middle,
/// * if it beats the best vertex the expansion `$\vec{x}_{worst} + 2.5\vec{d}$` is tried
///   and the better of both is kept,
/// * if it is only better than the worst vertex the outward contraction
///   `$\vec{x}_{worst} + 1.5\vec{d}$` is tried,
/// * otherwise the inward contraction `$\vec{x}_{worst} + 0.5\vec{d}$` is tried.
///
/// A failed contraction shrinks the worst and middle vertex halfway towards the best one.
/// Three vertices span a two dimensional simplex, so this is a search for problems
/// with two nonlinear parameters. Box constraints are not enforced.
#[derive(Debug, Clone)]
pub struct Simplex<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    state: StrategyState<ScalarType>,
    population: Vec<Vertex<ScalarType>>,
}

impl<ScalarType> Simplex<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// a strategy with an empty population
    pub fn new() -> Self {
        Self {
            state: StrategyState::default(),
            population: Vec::with_capacity(POPULATION_SIZE + 1),
        }
    }

    /// the vertices after the last run, ordered from best to worst
    pub fn population(&self) -> &[Vertex<ScalarType>] {
        &self.population
    }

    /// insert a vertex behind all vertices with a value that is not larger.
    /// NaN values rank behind every number.
    fn insert(&mut self, value: ScalarType, coord: Coord<ScalarType>) {
        let ranks_before = |lhs: ScalarType, rhs: ScalarType| {
            lhs < rhs || (is_nan(rhs) && !is_nan(lhs))
        };
        let position = self
            .population
            .iter()
            .position(|vertex| ranks_before(value, vertex.value))
            .unwrap_or(self.population.len());
        self.population.insert(position, Vertex { value, coord });
    }

    fn replace_worst(&mut self, value: ScalarType, coord: Coord<ScalarType>) {
        self.population.pop();
        self.insert(value, coord);
    }

    fn evaluate(
        objective: &mut dyn Objective<ScalarType>,
        coord: &Coord<ScalarType>,
    ) -> Result<ScalarType, ObjectiveError> {
        objective.evaluate(coord.as_vector())
    }

    fn record_best(&mut self) {
        if let Some(best) = self.population.first() {
            self.state.current_error = best.value;
            self.state.position = best.coord.as_vector().clone();
        }
    }

    fn best_value(&self) -> Option<ScalarType> {
        self.population.first().map(|vertex| vertex.value)
    }

    /// one reflection, expansion, contraction or shrink step
    fn iterate(&mut self, objective: &mut dyn Objective<ScalarType>) -> Result<(), ObjectiveError> {
        let best = self.population[0].clone();
        let middle = self.population[1].clone();
        let worst = self.population[2].clone();

        let two: ScalarType = nalgebra::convert(2.0);
        let centroid = (&best.coord + &middle.coord) / two;
        let direction = &centroid - &worst.coord;
        let step = |factor: f64| {
            let factor: ScalarType = nalgebra::convert(factor);
            &worst.coord + &(&direction * factor)
        };

        let reflected = step(2.0);
        let reflected_value = Self::evaluate(objective, &reflected)?;

        if best.value <= reflected_value && reflected_value <= middle.value {
            self.replace_worst(reflected_value, reflected);
        } else if reflected_value < best.value {
            let expanded = step(2.5);
            let expanded_value = Self::evaluate(objective, &expanded)?;
            if expanded_value < reflected_value {
                self.replace_worst(expanded_value, expanded);
            } else {
                self.replace_worst(reflected_value, reflected);
            }
        } else if reflected_value < worst.value {
            let contracted = step(1.5);
            let contracted_value = Self::evaluate(objective, &contracted)?;
            if contracted_value <= reflected_value {
                self.replace_worst(contracted_value, contracted);
            } else {
                self.shrink(objective, best, middle, worst)?;
            }
        } else {
            let contracted = step(0.5);
            let contracted_value = Self::evaluate(objective, &contracted)?;
            if contracted_value < worst.value {
                self.replace_worst(contracted_value, contracted);
            } else {
                self.shrink(objective, best, middle, worst)?;
            }
        }
        Ok(())
    }

    fn shrink(
        &mut self,
        objective: &mut dyn Objective<ScalarType>,
        best: Vertex<ScalarType>,
        middle: Vertex<ScalarType>,
        worst: Vertex<ScalarType>,
    ) -> Result<(), ObjectiveError> {
        let two: ScalarType = nalgebra::convert(2.0);
        let from_worst = (&worst.coord + &best.coord) / two;
        let from_middle = (&middle.coord + &best.coord) / two;
        let from_worst_value = Self::evaluate(objective, &from_worst)?;
        let from_middle_value = Self::evaluate(objective, &from_middle)?;

        self.population.clear();
        self.insert(best.value, best.coord);
        self.insert(from_worst_value, from_worst);
        self.insert(from_middle_value, from_middle);
        Ok(())
    }
}

impl<ScalarType> Default for Simplex<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

fn is_nan<ScalarType: PartialOrd>(value: ScalarType) -> bool {
    value.partial_cmp(&value).is_none()
}

impl<ScalarType> OptimizationStrategy<ScalarType> for Simplex<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn optimize(
        &mut self,
        max_error: ScalarType,
        max_iterations: usize,
        initial_parameters: &DMatrix<ScalarType>,
        objective: &mut dyn Objective<ScalarType>,
        cancellation: &CancellationToken,
    ) -> Result<(), StrategyError> {
        self.state.reset(max_error, max_iterations);
        self.population.clear();

        if initial_parameters.nrows() != POPULATION_SIZE {
            return Err(StrategyError::InvalidNumberOfStartingPoints {
                expected: POPULATION_SIZE,
                actual: initial_parameters.nrows(),
            });
        }
        if initial_parameters.ncols() == 0 {
            return Err(StrategyError::EmptyStartingPoints);
        }
        if initial_parameters.ncols() != 2 {
            warn!(
                dimensions = initial_parameters.ncols(),
                "a three point simplex spans only two dimensions of the parameter space"
            );
        }
        if self.state.bounds.is_some() {
            warn!("simplex strategy does not enforce box constraints");
        }

        for row in initial_parameters.row_iter() {
            let coord = Coord::from(row.transpose());
            let value = Self::evaluate(objective, &coord)?;
            self.insert(value, coord);
        }
        self.state.jacobian_info_available = objective.has_jacobian_info();
        self.record_best();

        while let Some(best_value) = self.best_value() {
            if best_value <= max_error {
                self.state.exit_message = Some("error dropped below the maximum error".into());
                break;
            }
            if self.state.current_iteration >= max_iterations {
                self.state.exit_message = Some("maximum number of iterations reached".into());
                break;
            }
            if cancellation.is_cancelled() {
                self.state.cancelled = true;
                self.state.exit_message = Some("cancelled".into());
                break;
            }
            self.state.current_iteration += 1;
            self.iterate(objective)?;
            self.record_best();
            debug!(
                iteration = self.state.current_iteration,
                error = %self.state.current_error,
                "simplex step"
            );
        }
        Ok(())
    }

    fn required_starting_points(&self) -> usize {
        POPULATION_SIZE
    }

    fn state(&self) -> &StrategyState<ScalarType> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StrategyState<ScalarType> {
        &mut self.state
    }
}
