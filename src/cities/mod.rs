use thiserror::Error;

/// Fewest cities for which two disjoint segments of two genes each exist.
pub const MIN_CITIES: usize = 4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CityError {
    #[error("Need at least {required} cities, got {found}")]
    TooFewCities { found: usize, required: usize },
    #[error("Coordinate of city {id} is not a finite number")]
    NonFiniteCoordinate { id: usize },
}

/// A city's position on the plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Immutable lookup from a city id (`1..=N`) to its coordinate.
///
/// Ids are assigned in input order, so the first coordinate passed to
/// [`CityTable::new`] becomes city `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct CityTable {
    coordinates: Vec<Coordinate>,
}

impl CityTable {
    /// Builds a table from an ordered list of coordinates.
    ///
    /// # Arguments
    /// * `coordinates` - City positions; position `i` in the slice gets id `i + 1`.
    ///
    /// # Returns
    /// * `Result<Self, CityError>` - The table, or an error if fewer than [`MIN_CITIES`]
    ///   coordinates were given or any coordinate is NaN/infinite.
    pub fn new<C>(coordinates: &[C]) -> Result<Self, CityError>
    where
        C: Copy + Into<Coordinate>,
    {
        if coordinates.len() < MIN_CITIES {
            return Err(CityError::TooFewCities {
                found: coordinates.len(),
                required: MIN_CITIES,
            });
        }

        let coordinates: Vec<Coordinate> = coordinates.iter().map(|&c| c.into()).collect();
        if let Some(index) = coordinates
            .iter()
            .position(|c| !c.x.is_finite() || !c.y.is_finite())
        {
            return Err(CityError::NonFiniteCoordinate { id: index + 1 });
        }

        Ok(Self { coordinates })
    }

    /// Number of cities in the table.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Iterator over every valid id, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        1..=self.coordinates.len()
    }

    /// Coordinate of city `id`, or `None` when the id is outside `1..=N`.
    pub fn coordinate(&self, id: usize) -> Option<&Coordinate> {
        id.checked_sub(1).and_then(|i| self.coordinates.get(i))
    }

    /// Euclidean distance between two cities.
    ///
    /// # Panics
    /// Panics if either id is outside `1..=N`. Tours only ever carry ids taken
    /// from this table, so an unknown id here means a corrupted genome.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.coordinates[a - 1].distance_to(&self.coordinates[b - 1])
    }

    /// Length of the open path visiting `route` in order (no return leg).
    pub fn path_length(&self, route: &[usize]) -> f64 {
        route
            .windows(2)
            .map(|pair| self.distance(pair[0], pair[1]))
            .sum()
    }
}
