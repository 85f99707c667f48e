use foundation::LandmarkId;
use foundation::math::{GeoPoint, LatLng};
use projection::{CameraRelativeProjector, ExactProjector, Projector, ScreenPoint, footprint_ring};
use scene::{
    ChromeRole, HoverSelection, Landmark, LandmarkRegistry, Pointer, SurfaceFilter, resolve_hover,
};
use serde::Serialize;
use tracing::{debug, info};
use valuation::{Appraiser, Classification, LandMask, TourismModel, Valuation, neighborhoods};

use crate::{
    ExhibitConfig, ExhibitError, FlyTo, InteractionMode, Journal, JournalEntry, Ledger, MapHost,
    PostcardDesk, PostcardFailure, PostcardImage, PostcardRequest, PostcardState, PostcardTicket,
    Request, ledger, nearby_landmarks, plan_visit,
};

/// Economics and surface of a candidate site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteReport {
    pub valuation: Valuation,
    pub tourism_revenue_usd: f64,
    /// Provisional until an elevation arrives.
    pub classification: Classification,
}

/// The ghost under the pointer while placing or moving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub point: GeoPoint,
    /// Capture-radius circle around `point`, in screen space.
    pub footprint: Vec<ScreenPoint>,
    pub report: SiteReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerUpdate {
    Hover { selection: HoverSelection },
    /// `None` hides the ghost: the pointer is off the map.
    Preview { preview: Option<Preview> },
    /// Visiting; the pointer does nothing.
    Inactive,
}

/// An elevation the caller should fetch and hand back through
/// [`Session::apply_elevation`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ElevationLookup {
    pub id: LandmarkId,
    pub at: LatLng,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Absorbed by chrome, off the map, or meaningless in this mode.
    Ignored,
    /// Clicked a hovered landmark; its action menu should open.
    Selected { id: LandmarkId },
    Placed { lookup: ElevationLookup },
    Moved { lookup: ElevationLookup },
}

/// One visitor's exhibit: landmarks, mode, hover and postcard state.
///
/// The session never caches the camera; every projection re-reads it from
/// the host.
#[derive(Debug)]
pub struct Session {
    config: ExhibitConfig,
    projector: CameraRelativeProjector,
    appraiser: Appraiser,
    tourism: TourismModel,
    land: LandMask,
    landmarks: LandmarkRegistry,
    surface: SurfaceFilter,
    mode: InteractionMode,
    hover: HoverSelection,
    preview: Option<Preview>,
    postcards: PostcardDesk,
    journal: Journal,
}

impl Session {
    /// Starts a session over `host`.
    ///
    /// Fails with [`ExhibitError::EngineUnavailable`] when the engine has no
    /// usable camera or viewport; nothing else can work without one.
    pub fn start<H: MapHost + ?Sized>(
        config: ExhibitConfig,
        host: &H,
    ) -> Result<Self, ExhibitError> {
        config.validate()?;
        let pose = host
            .camera()
            .ok_or_else(|| ExhibitError::EngineUnavailable("the map has no camera".into()))?;
        if !pose.is_usable() {
            return Err(ExhibitError::EngineUnavailable(format!("unusable camera pose {pose:?}")));
        }
        let viewport = host.viewport();
        if !viewport.is_usable() {
            return Err(ExhibitError::EngineUnavailable(format!(
                "viewport is {}x{}",
                viewport.width, viewport.height
            )));
        }

        let appraiser = Appraiser::builtin(config.appraisal)?;
        let land = LandMask::builtin()?.clone();
        let tourism = TourismModel::new(config.tourism);
        let sentinel_site = GeoPoint::ground(config.sentinel.lat, config.sentinel.lng);
        let sentinel_report = survey_site(&appraiser, &tourism, &land, sentinel_site, None);

        let mut session = Self {
            projector: config.projector(),
            appraiser,
            tourism,
            land,
            landmarks: LandmarkRegistry::new(landmark_at(
                scene::SENTINEL_ID,
                sentinel_site,
                sentinel_report,
            )),
            surface: SurfaceFilter::default(),
            mode: InteractionMode::Idle,
            hover: HoverSelection::none(),
            preview: None,
            postcards: PostcardDesk::new(),
            journal: Journal::new(config.journal_capacity),
            config,
        };
        session.record("start", "session started");
        Ok(session)
    }

    pub fn config(&self) -> &ExhibitConfig {
        &self.config
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn hover(&self) -> HoverSelection {
        self.hover
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn landmarks(&self) -> &LandmarkRegistry {
        &self.landmarks
    }

    pub fn landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.get(id)
    }

    pub fn surface(&self) -> &SurfaceFilter {
        &self.surface
    }

    /// Chrome regions are registered here as the UI lays itself out.
    pub fn surface_mut(&mut self) -> &mut SurfaceFilter {
        &mut self.surface
    }

    pub fn postcard_state(&self) -> &PostcardState {
        self.postcards.state()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn drain_journal(&mut self) -> Vec<JournalEntry> {
        self.journal.drain()
    }

    pub fn ledger(&self) -> Ledger {
        ledger::tally(self.landmarks.placed(), &self.config.construction)
    }

    /// Valuation, tourism and surface for a point, using the installed
    /// neighborhood polygons if any.
    pub fn survey(&self, point: GeoPoint, elevation_m: Option<f64>) -> SiteReport {
        survey_site(&self.appraiser, &self.tourism, &self.land, point, elevation_m)
    }

    pub fn request_placement(&mut self) -> Result<(), ExhibitError> {
        self.require_idle(Request::Place)?;
        self.mode = InteractionMode::Placing;
        self.hover = HoverSelection::none();
        self.preview = None;
        Ok(())
    }

    pub fn request_move(&mut self, id: LandmarkId) -> Result<(), ExhibitError> {
        self.require_idle(Request::Move(id))?;
        if self.landmarks.is_sentinel(id) {
            return Err(ExhibitError::SentinelImmutable);
        }
        if !self.landmarks.contains(id) {
            return Err(ExhibitError::UnknownLandmark(id));
        }
        self.mode = InteractionMode::Moving(id);
        self.hover = HoverSelection::none();
        self.preview = None;
        Ok(())
    }

    /// Flies to `id` and enters [`InteractionMode::Visiting`].
    pub fn request_visit<H: MapHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: LandmarkId,
    ) -> Result<FlyTo, ExhibitError> {
        self.require_idle(Request::Visit(id))?;
        let target = self.landmarks.get(id).ok_or(ExhibitError::UnknownLandmark(id))?.lat_lng();
        let heading = host
            .camera()
            .map(|pose| pose.heading_deg)
            .unwrap_or(self.config.default_pose.heading_deg);
        let reference = (!self.landmarks.is_sentinel(id)).then_some(self.config.sentinel);
        let fly = plan_visit(target, reference, heading, &self.config.visit);
        host.fly_camera_to(fly);

        self.mode = InteractionMode::Visiting(id);
        self.hover = HoverSelection::none();
        self.record("visit", format!("visiting {id}"));
        Ok(fly)
    }

    /// Leaves a visit, flying back to the default pose. Returns the postcard
    /// ticket to abort, if one was pending.
    pub fn exit_visit<H: MapHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Option<PostcardTicket>, ExhibitError> {
        if !matches!(self.mode, InteractionMode::Visiting(_)) {
            return Err(self.invalid(Request::ExitVisit));
        }
        let aborted = self.postcards.dismiss();
        self.mode = InteractionMode::Idle;
        self.fly_home(host);
        self.record("visit", "visit ended");
        Ok(aborted)
    }

    /// Drops out of placing or moving. A no-op when idle.
    pub fn cancel(&mut self) -> Result<(), ExhibitError> {
        match self.mode {
            InteractionMode::Idle => Ok(()),
            InteractionMode::Placing | InteractionMode::Moving(_) => {
                self.mode = InteractionMode::Idle;
                self.preview = None;
                Ok(())
            }
            InteractionMode::Visiting(_) => Err(self.invalid(Request::Cancel)),
        }
    }

    pub fn pointer_move<H: MapHost + ?Sized>(
        &mut self,
        host: &H,
        screen: ScreenPoint,
    ) -> PointerUpdate {
        match self.mode {
            InteractionMode::Idle => {
                let pointer = self.pointer_at(host, screen);
                let anchors = self.landmarks.anchors();
                self.hover = resolve_hover(pointer, &anchors, &self.config.hover, self.hover);
                PointerUpdate::Hover { selection: self.hover }
            }
            InteractionMode::Placing | InteractionMode::Moving(_) => {
                self.preview = self.preview_at(host, screen);
                PointerUpdate::Preview {
                    preview: self.preview.clone(),
                }
            }
            InteractionMode::Visiting(_) => PointerUpdate::Inactive,
        }
    }

    /// The pointer left the map container.
    pub fn pointer_leave(&mut self) {
        self.hover = HoverSelection::none();
        self.preview = None;
    }

    pub fn click<H: MapHost + ?Sized>(
        &mut self,
        host: &H,
        screen: ScreenPoint,
    ) -> Result<ClickOutcome, ExhibitError> {
        match self.mode {
            InteractionMode::Idle => Ok(match self.hover.hovered {
                Some(id) if self.landmarks.contains(id) => ClickOutcome::Selected { id },
                _ => ClickOutcome::Ignored,
            }),
            InteractionMode::Visiting(_) => Ok(ClickOutcome::Ignored),
            InteractionMode::Placing => {
                let Some(preview) = self.preview_at(host, screen) else {
                    debug!("placement click off the map at ({}, {})", screen.x, screen.y);
                    return Ok(ClickOutcome::Ignored);
                };
                let point = preview.point;
                let id = self
                    .landmarks
                    .insert_with(|id| landmark_at(id, point, preview.report));
                self.settle();
                info!(%id, lat = point.lat, lng = point.lng, "landmark placed");
                self.record("place", format!("placed {id} at {:.5}, {:.5}", point.lat, point.lng));
                Ok(ClickOutcome::Placed {
                    lookup: ElevationLookup {
                        id,
                        at: point.lat_lng(),
                    },
                })
            }
            InteractionMode::Moving(id) => {
                let Some(preview) = self.preview_at(host, screen) else {
                    debug!("move click off the map at ({}, {})", screen.x, screen.y);
                    return Ok(ClickOutcome::Ignored);
                };
                let point = preview.point;
                let moved = landmark_at(id, point, preview.report);
                *self.landmarks.get_mut(id)? = moved;
                self.settle();
                info!(%id, lat = point.lat, lng = point.lng, "landmark moved");
                self.record("move", format!("moved {id} to {:.5}, {:.5}", point.lat, point.lng));
                Ok(ClickOutcome::Moved {
                    lookup: ElevationLookup {
                        id,
                        at: point.lat_lng(),
                    },
                })
            }
        }
    }

    pub fn remove(&mut self, id: LandmarkId) -> Result<Landmark, ExhibitError> {
        self.require_idle(Request::Remove(id))?;
        let removed = self.landmarks.remove(id)?;
        self.hover.forget(id);
        info!(%id, "landmark removed");
        self.record("remove", format!("removed {id}"));
        Ok(removed)
    }

    /// Removes every placed landmark and flies home. Returns how many went
    /// and the postcard ticket to abort, if one was pending.
    pub fn erase_all<H: MapHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> (usize, Option<PostcardTicket>) {
        let removed = self.landmarks.clear_placed();
        let aborted = self.postcards.dismiss();
        self.mode = InteractionMode::Idle;
        self.hover = HoverSelection::none();
        self.preview = None;
        self.fly_home(host);
        info!(removed, "landmarks erased");
        self.record("erase", format!("erased {removed} landmarks"));
        (removed, aborted)
    }

    /// Flies to the default pose. While visiting this ends the visit, and the
    /// postcard ticket to abort is returned alongside the flight.
    pub fn reset_view<H: MapHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> (FlyTo, Option<PostcardTicket>) {
        let mut aborted = None;
        if matches!(self.mode, InteractionMode::Visiting(_)) {
            aborted = self.postcards.dismiss();
            self.mode = InteractionMode::Idle;
            self.record("visit", "visit ended");
        }
        (self.fly_home(host), aborted)
    }

    /// Refines a landmark's surface with an elevation result; `None` means
    /// the lookup failed and the current guess stands.
    ///
    /// Returns false when the lookup is stale: the landmark is gone or has
    /// moved since.
    pub fn apply_elevation(&mut self, lookup: ElevationLookup, elevation_m: Option<f64>) -> bool {
        let Some(elevation) = elevation_m.filter(|e| e.is_finite()) else {
            debug!(id = %lookup.id, "no elevation; keeping provisional surface");
            return false;
        };
        let atlas = neighborhoods::current();
        let classification = self.land.classify(atlas.as_deref(), lookup.at, Some(elevation));
        let Ok(landmark) = self.landmarks.get_mut(lookup.id) else {
            return false;
        };
        if landmark.lat_lng() != lookup.at {
            debug!(id = %lookup.id, "discarding elevation for a previous position");
            return false;
        }
        landmark.position.altitude_m = elevation.max(0.0);
        landmark.classification = classification;
        true
    }

    /// Starts a postcard of the visited landmark.
    ///
    /// Any postcard still pending is superseded; its result will be ignored
    /// and its ticket is returned last so the caller can abort the request.
    pub fn begin_postcard<H: MapHost + ?Sized>(
        &mut self,
        host: &H,
    ) -> Result<(PostcardTicket, PostcardRequest, Option<PostcardTicket>), ExhibitError> {
        let InteractionMode::Visiting(id) = self.mode else {
            return Err(self.invalid(Request::Postcard));
        };
        let visited = self.landmarks.get(id).ok_or(ExhibitError::UnknownLandmark(id))?;
        let heading_deg = host
            .camera()
            .map(|pose| pose.heading_deg)
            .unwrap_or(self.config.default_pose.heading_deg);
        let request = PostcardRequest {
            visited_id: id,
            visited: visited.lat_lng(),
            neighborhood: visited.neighborhood_label.clone(),
            reference: self.config.sentinel,
            heading_deg,
            reference_min_m: self.config.visit.reference_min_m,
            nearby: nearby_landmarks(visited, self.landmarks.iter(), &self.config.postcard),
        };
        let (ticket, superseded) = self.postcards.begin();
        self.record("postcard", format!("postcard {} requested for {id}", ticket.get()));
        Ok((ticket, request, superseded))
    }

    /// Hands back a postcard result. Returns false for a stale ticket.
    pub fn complete_postcard(
        &mut self,
        ticket: PostcardTicket,
        result: Result<PostcardImage, PostcardFailure>,
    ) -> bool {
        let message = match &result {
            Ok(_) => format!("postcard {} ready", ticket.get()),
            Err(reason) => format!("postcard {} unavailable: {reason}", ticket.get()),
        };
        let accepted = self.postcards.complete(ticket, result);
        if accepted {
            self.record("postcard", message);
        }
        accepted
    }

    pub fn dismiss_postcard(&mut self) -> Option<PostcardTicket> {
        self.postcards.dismiss()
    }

    fn pointer_at<H: MapHost + ?Sized>(&self, host: &H, screen: ScreenPoint) -> Pointer {
        if self.surface.is_over_role(screen, ChromeRole::ActionMenu) {
            return Pointer::OverMenu;
        }
        if !self.surface.is_on_surface(host.viewport(), screen) {
            return Pointer::OffSurface;
        }
        match self.project(host, screen) {
            Some(point) => Pointer::Ground(point.lat_lng()),
            None => Pointer::OffSurface,
        }
    }

    fn project<H: MapHost + ?Sized>(&self, host: &H, screen: ScreenPoint) -> Option<GeoPoint> {
        let pose = host.camera()?;
        ExactProjector::new(host.exact_projection(), self.projector).screen_to_geo(
            &pose,
            host.viewport(),
            screen,
        )
    }

    fn preview_at<H: MapHost + ?Sized>(&self, host: &H, screen: ScreenPoint) -> Option<Preview> {
        let viewport = host.viewport();
        if !self.surface.is_on_surface(viewport, screen) {
            return None;
        }
        let pose = host.camera()?;
        let projector = ExactProjector::new(host.exact_projection(), self.projector);
        let point = projector.screen_to_geo(&pose, viewport, screen)?;
        let footprint = footprint_ring(
            &projector,
            &pose,
            viewport,
            point.lat_lng(),
            self.config.hover.capture_radius_m,
            self.config.footprint_segments,
        );
        Some(Preview {
            point,
            footprint,
            report: self.survey(point, None),
        })
    }

    fn fly_home<H: MapHost + ?Sized>(&self, host: &mut H) -> FlyTo {
        let fly = FlyTo {
            end_camera: self.config.default_pose,
            center_altitude_m: 0.0,
            duration_ms: self.config.reset_duration_ms,
        };
        host.fly_camera_to(fly);
        fly
    }

    fn settle(&mut self) {
        self.mode = InteractionMode::Idle;
        self.preview = None;
        self.hover = HoverSelection::none();
    }

    fn require_idle(&self, request: Request) -> Result<(), ExhibitError> {
        if self.mode.is_idle() {
            Ok(())
        } else {
            Err(self.invalid(request))
        }
    }

    fn invalid(&self, request: Request) -> ExhibitError {
        ExhibitError::InvalidTransition {
            from: self.mode,
            request,
        }
    }

    fn record(&mut self, kind: &'static str, message: impl Into<String>) {
        self.journal.record(kind, message);
    }
}

fn landmark_at(id: LandmarkId, point: GeoPoint, report: SiteReport) -> Landmark {
    Landmark {
        id,
        position: point,
        neighborhood_label: report.valuation.neighborhood,
        land_value_usd: report.valuation.land_value_usd,
        rate_per_sq_ft: report.valuation.rate_per_sq_ft,
        tourism_revenue_usd: report.tourism_revenue_usd,
        classification: report.classification,
    }
}

fn survey_site(
    appraiser: &Appraiser,
    tourism: &TourismModel,
    land: &LandMask,
    point: GeoPoint,
    elevation_m: Option<f64>,
) -> SiteReport {
    let ll = point.lat_lng();
    let atlas = neighborhoods::current();
    SiteReport {
        valuation: appraiser.valuate(ll.lat, ll.lng),
        tourism_revenue_usd: tourism.tourism_revenue(ll.lat, ll.lng),
        classification: land.classify(atlas.as_deref(), ll, elevation_m),
    }
}
