//! Time parameterized trajectories along geometric paths.
//!
//! A [Path](path::Path) is built from waypoints and sampled by arc length. The
//! [TrajectoryPlanner](planner::TrajectoryPlanner) assigns a velocity to each sample that
//! respects every [TimingConstraint](timing_constraints::TimingConstraint), which results in a
//! [Trajectory](timed_trajectory::Trajectory) that can be sampled by time.

/// Provides the spline paths through waypoints
pub mod path;

/// Provides the velocity and acceleration constraints along a path
pub mod timing_constraints;

/// Provides the time parameterization of paths
pub mod planner;

/// Provides the time indexed trajectory
pub mod timed_trajectory;
