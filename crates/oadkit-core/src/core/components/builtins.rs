//! Built-in aircraft sizing disciplines.
//!
//! These cover a classic conceptual-design loop for a tube-and-wing transport: geometry,
//! aerodynamics, mass breakdown, mission performance, handling qualities and the wing
//! area / MTOW consistency loops.

use super::component::{ComponentSchema, OptionKind, OptionSchema};

const DEFAULT_PROPULSION: &str = "fastoad.wrapper.propulsion.rubber_engine";

fn propulsion_option() -> OptionSchema {
    OptionSchema::new("propulsion_id", OptionKind::String).with_default(DEFAULT_PROPULSION)
}

pub fn catalog() -> Vec<ComponentSchema> {
    vec![
        ComponentSchema::new("fastoad.geometry.legacy")
            .describe("Wing, fuselage, tail and nacelle geometry from top-level design parameters")
            .inputs(&[
                "data:geometry:wing:area",
                "data:geometry:wing:aspect_ratio",
                "data:geometry:wing:sweep_25",
                "data:geometry:wing:MAC:at25percent:x",
                "data:geometry:cabin:NPAX1",
                "data:geometry:propulsion:engine:count",
            ])
            .outputs(&[
                "data:geometry:wing:span",
                "data:geometry:wing:MAC:length",
                "data:geometry:wing:wetted_area",
                "data:geometry:fuselage:length",
                "data:geometry:fuselage:wetted_area",
                "data:geometry:horizontal_tail:wetted_area",
                "data:geometry:vertical_tail:wetted_area",
                "data:geometry:aircraft:wetted_area",
            ])
            .option(propulsion_option())
            .option(
                OptionSchema::new("cabin_sizing", OptionKind::Float)
                    .with_default(1.0)
                    .with_range(Some(0.0), Some(1.0)),
            ),
        ComponentSchema::new("fastoad.aerodynamics.lowspeed.legacy")
            .describe("Low-speed lift and drag polar")
            .inputs(&[
                "data:geometry:wing:area",
                "data:geometry:wing:span",
                "data:geometry:aircraft:wetted_area",
            ])
            .outputs(&[
                "data:aerodynamics:aircraft:low_speed:CD0",
                "data:aerodynamics:aircraft:low_speed:CL_alpha",
                "data:aerodynamics:aircraft:low_speed:CL_max_clean",
            ])
            .option(propulsion_option())
            .option(OptionSchema::new("use_openvsp", OptionKind::Bool).with_default(false)),
        ComponentSchema::new("fastoad.aerodynamics.highspeed.legacy")
            .describe("Cruise lift and drag polar including compressibility drag")
            .inputs(&[
                "data:geometry:wing:area",
                "data:geometry:wing:sweep_25",
                "data:geometry:aircraft:wetted_area",
                "data:TLAR:cruise_mach",
            ])
            .outputs(&[
                "data:aerodynamics:aircraft:cruise:CD0",
                "data:aerodynamics:aircraft:cruise:L_D_max",
                "data:aerodynamics:aircraft:cruise:optimal_CL",
            ])
            .option(propulsion_option())
            .option(OptionSchema::new("use_openvsp", OptionKind::Bool).with_default(false))
            .option(OptionSchema::new("result_folder_path", OptionKind::String).with_default("")),
        ComponentSchema::new("fastoad.aerodynamics.takeoff")
            .describe("High-lift increments in takeoff configuration")
            .inputs(&[
                "data:geometry:wing:area",
                "data:mission:sizing:takeoff:flap_angle",
                "data:mission:sizing:takeoff:slat_angle",
            ])
            .outputs(&[
                "data:aerodynamics:aircraft:takeoff:CL",
                "data:aerodynamics:aircraft:takeoff:CD",
            ]),
        ComponentSchema::new("fastoad.aerodynamics.landing.legacy")
            .describe("Maximum lift coefficient in landing configuration")
            .inputs(&[
                "data:geometry:wing:area",
                "data:aerodynamics:aircraft:low_speed:CL_max_clean",
                "data:mission:sizing:landing:flap_angle",
            ])
            .outputs(&["data:aerodynamics:aircraft:landing:CL_max"])
            .option(OptionSchema::new("use_xfoil", OptionKind::Bool).with_default(false))
            .option(
                OptionSchema::new("xfoil_alpha_min", OptionKind::Float)
                    .with_default(0.0)
                    .with_range(Some(-90.0), Some(90.0)),
            )
            .option(
                OptionSchema::new("xfoil_alpha_max", OptionKind::Float)
                    .with_default(22.0)
                    .with_range(Some(-90.0), Some(90.0)),
            ),
        ComponentSchema::new("fastoad.weight.legacy")
            .describe("Operating empty weight breakdown from statistical mass models")
            .inputs(&[
                "data:geometry:wing:area",
                "data:geometry:wing:span",
                "data:geometry:fuselage:length",
                "data:weight:aircraft:MTOW",
                "data:weight:aircraft:MZFW",
            ])
            .outputs(&[
                "data:weight:airframe:wing:mass",
                "data:weight:airframe:fuselage:mass",
                "data:weight:aircraft:OWE",
                "data:weight:aircraft:CG:aft:x",
            ])
            .option(propulsion_option())
            .option(
                OptionSchema::new("payload_from_npax", OptionKind::Bool).with_default(true),
            ),
        ComponentSchema::new("fastoad.mass_performances.compute_MTOW")
            .describe("MTOW as the sum of OWE, payload and mission fuel")
            .inputs(&[
                "data:weight:aircraft:OWE",
                "data:weight:aircraft:payload",
                "data:mission:sizing:needed_block_fuel",
            ])
            .outputs(&["data:weight:aircraft:MTOW"]),
        ComponentSchema::new("fastoad.performances.mission")
            .describe("Mission simulation from a mission definition file")
            .inputs(&[
                "data:weight:aircraft:MTOW",
                "data:weight:aircraft:OWE",
                "data:aerodynamics:aircraft:cruise:CD0",
                "data:aerodynamics:aircraft:cruise:L_D_max",
                "data:TLAR:range",
            ])
            .outputs(&[
                "data:mission:sizing:needed_block_fuel",
                "data:mission:sizing:fuel",
                "data:mission:sizing:ZFW",
            ])
            .option(propulsion_option())
            .option(OptionSchema::new("mission_file_path", OptionKind::String).with_default("::sizing_mission"))
            .option(OptionSchema::new("out_file", OptionKind::String).with_default(""))
            .option(
                OptionSchema::new("use_initializer_iteration", OptionKind::Bool)
                    .with_default(true),
            )
            .option(OptionSchema::new("adjust_fuel", OptionKind::Bool).with_default(true))
            .option(
                OptionSchema::new("compute_TOW", OptionKind::Bool).with_default(false),
            )
            .option(
                OptionSchema::new("mission_name", OptionKind::String)
                    .with_default("sizing"),
            ),
        ComponentSchema::new("fastoad.handling_qualities.static_margin")
            .describe("Static margin from the neutral point and the aft centre of gravity")
            .inputs(&[
                "data:weight:aircraft:CG:aft:x",
                "data:geometry:wing:MAC:length",
                "data:geometry:wing:MAC:at25percent:x",
                "data:aerodynamics:aircraft:cruise:CL_alpha",
            ])
            .outputs(&["data:handling_qualities:static_margin"])
            .option(
                OptionSchema::new("target", OptionKind::Float)
                    .with_default(0.05)
                    .with_range(Some(-1.0), Some(1.0)),
            ),
        ComponentSchema::new("fastoad.handling_qualities.tail_sizing")
            .describe("Horizontal and vertical tail areas for trim and engine-out control")
            .inputs(&[
                "data:weight:aircraft:CG:aft:x",
                "data:geometry:wing:MAC:length",
                "data:geometry:fuselage:length",
            ])
            .outputs(&[
                "data:geometry:horizontal_tail:area",
                "data:geometry:vertical_tail:area",
            ])
            .option(propulsion_option()),
        ComponentSchema::new("fastoad.loop.wing_area")
            .describe("Wing area from fuel capacity and approach speed requirements")
            .inputs(&[
                "data:mission:sizing:fuel",
                "data:TLAR:approach_speed",
                "data:aerodynamics:aircraft:landing:CL_max",
                "data:weight:aircraft:MLW",
            ])
            .outputs(&["data:geometry:wing:area"]),
        ComponentSchema::new("fastoad.loop.mtow")
            .describe("Closes the weight loop between estimated and computed MTOW")
            .inputs(&[
                "data:weight:aircraft:OWE",
                "data:weight:aircraft:payload",
                "data:mission:sizing:fuel",
            ])
            .outputs(&[
                "data:weight:aircraft:MTOW",
                "data:weight:aircraft:MZFW",
                "data:weight:aircraft:MLW",
            ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifiers_are_unique() {
        let catalog = catalog();
        let ids: HashSet<_> = catalog.iter().map(|s| s.identifier.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn every_builtin_instantiates_without_resources() {
        for schema in catalog() {
            assert!(schema.requires.is_empty());
            assert!(schema.instantiate().is_ok(), "{}", schema.identifier);
        }
    }

    #[test]
    fn defaults_pass_their_own_checks() {
        for schema in catalog() {
            for option in &schema.options {
                if let Some(default) = &option.default {
                    assert!(option.check(default).is_ok(), "{}.{}", schema.identifier, option.name);
                }
            }
        }
    }
}
