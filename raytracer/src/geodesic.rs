//! Per-pixel light path integrator.
//!
//! A ray is marched through the scene in straight segments. Before every segment its direction is bent
//! towards each body by the inverse-square acceleration over the time the segment takes at light speed.
//! The bend is doubled relative to a Newtonian corpuscle so the weak-field deflection angle matches
//! `4GM / (c² b)`. This is a stylised lensing model, not a null-geodesic solver.
use glam::DVec3;
use scene::{Body, Color, Config, Scene, C, G};

/// Fraction of a body's radius below which its pull stops growing.
const SOFTENING_FRACTION: f64 = 1e-3;

/// Upper bound on a single segment as a fraction of the escape radius.
const MAX_STEP_FRACTION: f64 = 0.05;

/// Fraction of the smallest body radius used as the shortest segment.
const MIN_STEP_FRACTION: f64 = 0.01;

/// Scale from acceleration to direction change per meter travelled.
const DEFLECTION: f64 = 2.0 / (C * C);

const DISK_HOT: Color = Color([1.0, 0.95, 0.8]);
const DISK_COOL: Color = Color([1.0, 0.35, 0.05]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction: direction.normalize() }
    }
}

/// Knobs of the integrator that are fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSettings {
    /// Hard cap on segments per ray; exhausting it counts as an escape.
    pub max_steps: u32,
    /// Escape radius as a multiple of the scene extent.
    pub escape_factor: f64,
    /// Segment length as a fraction of the gap to the nearest body surface.
    pub step_fraction: f64,
    pub background: Color,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TraceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_steps: config.render.max_steps,
            escape_factor: config.render.escape_factor,
            step_fraction: config.render.step_fraction,
            background: config.render.background,
        }
    }
}

/// How a trace ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    Horizon,
    /// Index into `Scene::bodies`.
    Body(usize),
    /// In-plane distance of the crossing from the central body.
    Disk(f64),
    Escape,
    StepBudget,
    /// Position or direction became non-finite.
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    pub color: Color,
    pub termination: Termination,
    pub steps: u32,
}

/// Integrator bound to one scene. Holds no mutable state, so a single instance can be shared by every worker.
#[derive(Debug, Clone)]
pub struct Tracer<'a> {
    scene: &'a Scene,
    settings: TraceSettings,
    center: DVec3,
    escape_radius: f64,
    min_step: f64,
    max_step: f64,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, settings: &TraceSettings) -> Self {
        let escape_radius = scene.extent() * settings.escape_factor;
        let min_step = scene.smallest_radius() * MIN_STEP_FRACTION;
        Self {
            scene,
            settings: *settings,
            center: scene.central().position,
            escape_radius,
            min_step,
            max_step: (escape_radius * MAX_STEP_FRACTION).max(min_step),
        }
    }

    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    pub fn trace(&self, ray: &Ray) -> Color {
        self.trace_detailed(ray).color
    }

    /// Traces `ray` and reports how it ended. Always returns within `max_steps` segments.
    pub fn trace_detailed(&self, ray: &Ray) -> TraceResult {
        let mut position = ray.origin;
        let mut direction = ray.direction;

        if !position.is_finite() || !direction.is_finite() {
            return self.finish(Termination::Numeric, 0);
        }
        if let Some(termination) = self.hit_test(position) {
            return self.finish(termination, 0);
        }
        match self.enter_escape_sphere(position, direction) {
            Some(entry) => position = entry,
            None => return self.finish(Termination::Escape, 0),
        }

        for step in 1..=self.settings.max_steps {
            let (acceleration, gap) = self.field(position);
            let step_length = (gap * self.settings.step_fraction).clamp(self.min_step, self.max_step);

            direction = (direction + acceleration * (DEFLECTION * step_length)).normalize();
            let previous = position;
            position += direction * step_length;

            if let Some(termination) = self.segment_end(previous, position, direction) {
                return self.finish(termination, step);
            }
        }

        self.finish(Termination::StepBudget, self.settings.max_steps)
    }

    /// Start of the march for a ray leaving `position`.
    ///
    /// Inside the escape sphere that is `position` itself. Outside it the ray is moved along its straight line
    /// to where it enters the sphere. `None` if it never does.
    fn enter_escape_sphere(&self, position: DVec3, direction: DVec3) -> Option<DVec3> {
        let outward = position - self.center;
        let radius_squared = self.escape_radius * self.escape_radius;
        let distance_squared = outward.length_squared();
        if distance_squared <= radius_squared {
            return Some(position);
        }

        let along = outward.dot(direction);
        let closest_squared = distance_squared - along * along;
        if along >= 0.0 || closest_squared >= radius_squared {
            return None;
        }
        Some(position + direction * (-along - (radius_squared - closest_squared).sqrt()))
    }

    /// Termination at the end of the segment `previous -> position`, checked in priority order:
    /// numeric failure, horizon, other bodies, disk crossing, escape.
    fn segment_end(&self, previous: DVec3, position: DVec3, direction: DVec3) -> Option<Termination> {
        if !position.is_finite() || !direction.is_finite() {
            return Some(Termination::Numeric);
        }
        if let Some(termination) = self.hit_test(position) {
            return Some(termination);
        }
        if let Some(radius) = self.disk_crossing(previous, position) {
            return Some(Termination::Disk(radius));
        }
        let outward = position - self.center;
        (outward.length() > self.escape_radius && outward.dot(direction) > 0.0).then_some(Termination::Escape)
    }

    /// Net acceleration at `position` and the gap to the nearest body surface.
    fn field(&self, position: DVec3) -> (DVec3, f64) {
        let mut acceleration = DVec3::ZERO;
        let mut gap = f64::INFINITY;
        for body in self.scene.bodies() {
            let offset = body.position - position;
            let distance = offset.length();
            gap = gap.min(distance - body.radius);

            let softened = distance.max(body.radius * SOFTENING_FRACTION);
            acceleration += offset * (G * body.mass / (softened * softened * softened));
        }
        (acceleration, gap)
    }

    /// Horizon first, then the other bodies in scene order.
    fn hit_test(&self, position: DVec3) -> Option<Termination> {
        let central = self.scene.central_index();
        let bodies = self.scene.bodies();
        if inside(&bodies[central], position) {
            return Some(Termination::Horizon);
        }
        bodies
            .iter()
            .enumerate()
            .find(|(index, body)| *index != central && inside(body, position))
            .map(|(index, _)| Termination::Body(index))
    }

    /// In-plane radius where the segment pierces the disk, if it does.
    ///
    /// Only a strict sign change of the height above the disk plane counts as a crossing.
    fn disk_crossing(&self, from: DVec3, to: DVec3) -> Option<f64> {
        let h0 = from.y - self.center.y;
        let h1 = to.y - self.center.y;
        if h0 * h1 >= 0.0 {
            return None;
        }
        let t = h0 / (h0 - h1);
        let hit = from.lerp(to, t) - self.center;
        let radius = (hit.x * hit.x + hit.z * hit.z).sqrt();
        let disk = self.scene.disk();
        (disk.inner..=disk.outer).contains(&radius).then_some(radius)
    }

    fn finish(&self, termination: Termination, steps: u32) -> TraceResult {
        let color = match termination {
            Termination::Horizon => Color::BLACK,
            Termination::Body(index) => self.scene.bodies()[index].color,
            Termination::Disk(radius) => self.disk_color(radius),
            Termination::Escape | Termination::StepBudget | Termination::Numeric => self.settings.background,
        };
        TraceResult { color, termination, steps }
    }

    /// White-hot at the inner edge, fading to dim orange at the outer edge.
    fn disk_color(&self, radius: f64) -> Color {
        let disk = self.scene.disk();
        let t = ((radius - disk.inner) / (disk.outer - disk.inner)) as f32;
        DISK_HOT.lerp(DISK_COOL, t).scale(1.0 - 0.6 * t.clamp(0.0, 1.0))
    }
}

fn inside(body: &Body, position: DVec3) -> bool {
    position.distance_squared(body.position) < body.radius * body.radius
}

/// Traces `ray` through `scene` with the default settings.
pub fn trace(ray: &Ray, scene: &Scene) -> Color {
    Tracer::new(scene, &TraceSettings::default()).trace(ray)
}
