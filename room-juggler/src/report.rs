use crate::assignment::AssignmentState;
use crate::job::PartitionJob;
use crate::juggler::JuggleStats;
use crate::model::Gender;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RoomReport {
    pub name: String,
    pub capacity: usize,
    pub free_beds: usize,
    pub guests: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuestReport {
    pub name: String,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishReport {
    pub submitter: String,
    pub guests: Vec<String>,
    pub fulfilled: bool,
}

/// Result of one gender partition, with names instead of ids.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionReport {
    pub gender: Gender,
    pub solved: bool,
    pub happiness: i64,
    pub max_happiness: usize,
    /// Upper bound of `happiness`; above `max_happiness` when pairs share several wishes.
    pub max_weighted_happiness: i64,
    pub fulfilled_wishes: usize,
    pub n_wishes: usize,
    pub rooms: Vec<RoomReport>,
    pub guests: Vec<GuestReport>,
    pub wishes: Vec<WishReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<JuggleStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub partitions: Vec<PartitionReport>,
}

impl PartitionReport {
    /// Reports an unsolved partition as entirely unassigned.
    pub fn new(job: &PartitionJob) -> Self {
        let problem = &job.problem;
        let unassigned;
        let state = match job.state() {
            Some(state) => state,
            None => {
                unassigned = AssignmentState::new(problem);
                &unassigned
            }
        };
        let guest_name = |g: usize| problem.guests()[g].name.clone();

        let rooms = problem
            .rooms()
            .iter()
            .enumerate()
            .map(|(r, room)| RoomReport {
                name: room.name.clone(),
                capacity: room.capacity,
                free_beds: state.free_beds(problem, r),
                guests: state.occupants(r).iter().map(|&g| guest_name(g)).collect(),
            })
            .collect();
        let guests = problem
            .guests()
            .iter()
            .zip(state.room_id_of_guest())
            .map(|(guest, room)| GuestReport {
                name: guest.name.clone(),
                room: room.map(|r| problem.rooms()[r].name.clone()),
            })
            .collect();
        let wishes = problem
            .wishes()
            .iter()
            .zip(state.fulfilled_wishes())
            .map(|(wish, &fulfilled)| WishReport {
                submitter: wish.submitter.clone(),
                guests: wish.guest_ids.iter().map(|&g| guest_name(g)).collect(),
                fulfilled,
            })
            .collect();

        Self {
            gender: job.gender,
            solved: job.outcome.is_some(),
            happiness: state.happiness(),
            max_happiness: problem.max_happiness(),
            max_weighted_happiness: problem.max_weighted_happiness(),
            fulfilled_wishes: state.n_fulfilled(),
            n_wishes: problem.n_wishes(),
            rooms,
            guests,
            wishes,
            stats: job.outcome.as_ref().map(|o| o.stats.clone()),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: happiness {}/{}, {}/{} wishes fulfilled, {} rooms",
            self.gender,
            self.happiness,
            self.max_weighted_happiness,
            self.fulfilled_wishes,
            self.n_wishes,
            self.rooms.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::config::JuggleConfig;
    use crate::input::Roster;
    use crate::job::RoomJugglerJob;
    use crate::monitor::CancelFlag;

    const ROSTER: &str = r#"{
        "guests": [
            {"name": "Ann", "gender": "F"},
            {"name": "Ben", "gender": "M"},
            {"name": "Cat", "gender": "F"},
            {"name": "Dan", "gender": "M"}
        ],
        "rooms": [
            {"name": "Rose", "capacity": 2, "gender": "F"},
            {"name": "Oak", "capacity": 2, "gender": "M"}
        ],
        "wishes": [{"guests": ["Ann", "Cat"]}]
    }"#;

    fn job() -> RoomJugglerJob {
        let lists = Roster::from_json(ROSTER).unwrap().into_lists().unwrap();
        RoomJugglerJob::new(&lists).unwrap()
    }

    #[test]
    fn unsolved_job_reports_nobody_placed() {
        let report = job().report();
        let f = &report.partitions[0];
        assert!(!f.solved);
        assert!(f.stats.is_none());
        assert_eq!(f.rooms[0].free_beds, 2);
        assert!(f.guests.iter().all(|g| g.room.is_none()));
        assert!(!f.wishes[0].fulfilled);
    }

    #[test]
    fn solved_job_reports_names() {
        let mut job = job();
        let config = JuggleConfig::new(10, 0.5, 1.0, 0.1).unwrap();
        job.run(&config, 3, &CancelFlag::new()).unwrap();
        let report = job.report();

        let f = &report.partitions[0];
        assert!(f.solved);
        assert_eq!(f.rooms[0].name, "Rose");
        assert_eq!(f.rooms[0].free_beds, 0);
        assert_eq!(f.guests[1].room.as_deref(), Some("Rose"));
        assert_eq!(f.wishes[0].guests, ["Ann", "Cat"]);
        assert!(f.wishes[0].fulfilled);
        assert_eq!(f.summary(), "F: happiness 1/1, 1/1 wishes fulfilled, 1 rooms");

        let m = &report.partitions[1];
        let mut names = m.rooms[0].guests.clone();
        names.sort();
        assert_eq!(names, ["Ben", "Dan"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["partitions"][0]["gender"], "F");
        assert_eq!(json["partitions"][1]["happiness"], 0);
        assert!(json["partitions"][0]["stats"]["attempted"].is_u64());
    }

    #[test]
    fn summary_bound_counts_repeated_wishes() {
        let roster = r#"{
            "guests": [{"name": "Ann", "gender": "F"}, {"name": "Cat", "gender": "F"}],
            "rooms": [{"name": "Rose", "capacity": 2, "gender": "F"}],
            "wishes": [{"guests": ["Ann", "Cat"]}, {"guests": ["Cat", "Ann"]}]
        }"#;
        let lists = Roster::from_json(roster).unwrap().into_lists().unwrap();
        let mut job = RoomJugglerJob::new(&lists).unwrap();
        let config = JuggleConfig::new(10, 0.5, 1.0, 0.1).unwrap();
        job.run(&config, 0, &CancelFlag::new()).unwrap();

        let f = &job.report().partitions[0];
        assert_eq!(f.happiness, 2);
        assert_eq!(f.max_happiness, 1);
        assert_eq!(f.max_weighted_happiness, 2);
        assert_eq!(f.summary(), "F: happiness 2/2, 2/2 wishes fulfilled, 1 rooms");
    }
}
