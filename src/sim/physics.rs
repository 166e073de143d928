//! Rigid-body world backing the dice tray
//!
//! Thin wrapper over rapier3d. Everything outside this module speaks glam;
//! nalgebra types stay in here.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use super::state::Pose;
use crate::dice::{DieLibrary, DieType};
use crate::error::{DiceError, Result};
use crate::settings::PhysicsSettings;

/// Linear and angular velocity handed to a die at launch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
}

pub struct PhysicsWorld {
    settings: PhysicsSettings,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    /// Convex hull per die type, indexed by `DieType::index`
    hulls: Vec<SharedShape>,
}

impl PhysicsWorld {
    pub fn new(settings: &PhysicsSettings, library: &DieLibrary, dt: f32) -> Result<Self> {
        let hulls = library
            .iter()
            .map(|desc| {
                let points: Vec<Point<Real>> = desc
                    .collision
                    .vertices
                    .iter()
                    .map(|v| point![v.x, v.y, v.z])
                    .collect();
                SharedShape::convex_hull(&points)
                    .ok_or(DiceError::DegenerateHull { kind: desc.kind })
            })
            .collect::<Result<Vec<_>>>()?;

        let params = IntegrationParameters {
            dt,
            ..IntegrationParameters::default()
        };

        Ok(Self {
            settings: settings.clone(),
            gravity: vector![0.0, settings.gravity, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            hulls,
        })
    }

    /// Drop every body and collider
    pub fn clear(&mut self) {
        self.islands = IslandManager::new();
        self.broad_phase = BroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.ccd = CCDSolver::new();
    }

    /// Advance one fixed step
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    /// Static box collider (tray wall)
    pub fn add_fixed_box(&mut self, center: Vec3, half_extents: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed().translation(to_vector(center)).build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(self.settings.friction)
            .restitution(self.settings.restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Dynamic die body using the shared hull for its type
    pub fn add_die(&mut self, kind: DieType, position: Vec3, launch: &Launch) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(to_isometry(position, launch.rotation))
            .linvel(to_vector(launch.linvel))
            .angvel(to_vector(launch.angvel))
            .linear_damping(self.settings.damping)
            .angular_damping(self.settings.damping)
            .can_sleep(false)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::new(self.hulls[kind.index()].clone())
            .mass(self.settings.die_mass)
            .friction(self.settings.friction)
            .restitution(self.settings.restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        self.bodies.get(handle).map(|body| Pose {
            position: from_vector(body.translation()),
            rotation: from_rotation(body.rotation()),
        })
    }

    /// Linear and angular speed
    pub fn speeds(&self, handle: RigidBodyHandle) -> Option<(f32, f32)> {
        self.bodies
            .get(handle)
            .map(|body| (body.linvel().norm(), body.angvel().norm()))
    }

    /// Teleport a body and give it fresh velocities
    pub fn relaunch(&mut self, handle: RigidBodyHandle, position: Vec3, launch: &Launch) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_position(to_isometry(position, launch.rotation), true);
            body.set_linvel(to_vector(launch.linvel), true);
            body.set_angvel(to_vector(launch.angvel), true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_rotation(q: Quat) -> Rotation<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn from_rotation(r: &Rotation<Real>) -> Quat {
    let c = r.quaternion().coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(to_vector(position).into(), to_rotation(rotation))
}
