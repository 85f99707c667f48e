use std::cell::Cell;

use foundation::math::GeoPoint;
use tracing::debug;

use crate::{CameraPose, CameraRelativeProjector, Projector, ScreenPoint, Viewport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// The engine has not attached its projection yet.
    NotReady,
    /// The engine's transform callback threw.
    Callback(String),
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::NotReady => write!(f, "host projection not ready"),
            ProjectionError::Callback(msg) => write!(f, "host projection callback failed: {msg}"),
        }
    }
}

impl std::error::Error for ProjectionError {}

/// The host engine's own world/screen transform.
///
/// Implementations wrap whatever the engine exposes once its internal
/// projection is attached; `Ok(None)` means the engine declined (for example a
/// pixel above the horizon).
pub trait HostProjection {
    fn is_ready(&self) -> bool;

    fn geo_to_container(&self, point: GeoPoint) -> Result<Option<ScreenPoint>, ProjectionError>;

    fn container_to_geo(&self, screen: ScreenPoint) -> Result<Option<GeoPoint>, ProjectionError>;
}

/// Which transform an [`ExactProjector`] has settled on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProjectionPath {
    Exact,
    Approximate,
}

enum Route<T> {
    Exact(Option<T>),
    Approximate,
}

/// Projector that prefers the host's exact transform and falls back to the
/// camera-relative approximation.
///
/// This is the only projector interaction code should use, so the preview
/// drawn at a point and the click registered there go through the same path.
/// The first host answer decides the path for both directions: once the host
/// declines or fails, every later call uses the approximation, and once it
/// has answered, later calls stay exact (a declined point is `None`). Build
/// one per pointer event so a host that recovers is picked up again.
pub struct ExactProjector<'a> {
    host: Option<&'a dyn HostProjection>,
    fallback: CameraRelativeProjector,
    path: Cell<Option<ProjectionPath>>,
}

impl<'a> ExactProjector<'a> {
    pub fn new(host: Option<&'a dyn HostProjection>, fallback: CameraRelativeProjector) -> Self {
        Self {
            host,
            fallback,
            path: Cell::new(None),
        }
    }

    /// Adapter with no host transform attached.
    pub fn approximate_only(fallback: CameraRelativeProjector) -> Self {
        Self::new(None, fallback)
    }

    fn ready_host(&self) -> Option<&'a dyn HostProjection> {
        if self.path.get() == Some(ProjectionPath::Approximate) {
            return None;
        }
        self.host.filter(|h| h.is_ready())
    }

    pub fn has_exact(&self) -> bool {
        self.ready_host().is_some()
    }

    /// The settled path, or `None` before the first projection.
    pub fn path(&self) -> Option<ProjectionPath> {
        self.path.get()
    }

    fn route<T>(
        &self,
        call: impl FnOnce(&dyn HostProjection) -> Result<Option<T>, ProjectionError>,
        valid: impl FnOnce(&T) -> bool,
    ) -> Route<T> {
        let Some(host) = self.ready_host() else {
            self.path.set(Some(ProjectionPath::Approximate));
            return Route::Approximate;
        };
        let answer = match call(host) {
            Ok(Some(v)) if valid(&v) => Some(v),
            Ok(_) => {
                debug!("host projection declined");
                None
            }
            Err(err) => {
                debug!("host projection failed: {err}");
                None
            }
        };
        match (self.path.get(), answer) {
            (Some(ProjectionPath::Exact), answer) => Route::Exact(answer),
            (_, Some(v)) => {
                self.path.set(Some(ProjectionPath::Exact));
                Route::Exact(Some(v))
            }
            (_, None) => {
                debug!("falling back to camera-relative projection");
                self.path.set(Some(ProjectionPath::Approximate));
                Route::Approximate
            }
        }
    }
}

impl std::fmt::Debug for ExactProjector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactProjector")
            .field("has_exact", &self.has_exact())
            .field("path", &self.path.get())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl Projector for ExactProjector<'_> {
    fn screen_to_geo(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        screen: ScreenPoint,
    ) -> Option<GeoPoint> {
        if !viewport.contains(screen) {
            return None;
        }
        match self.route(|host| host.container_to_geo(screen), GeoPoint::is_finite) {
            Route::Exact(point) => point,
            Route::Approximate => self.fallback.screen_to_geo(pose, viewport, screen),
        }
    }

    fn geo_to_screen(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        point: GeoPoint,
    ) -> Option<ScreenPoint> {
        match self.route(|host| host.geo_to_container(point), ScreenPoint::is_finite) {
            Route::Exact(screen) => screen,
            Route::Approximate => self.fallback.geo_to_screen(pose, viewport, point),
        }
    }
}
