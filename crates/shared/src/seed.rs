use crate::domain::event::{EventFields, EventSort};
use crate::records::EventRecords;
use anyhow::Result;

struct DemoEvent {
    title: &'static str,
    image: &'static str,
    location: &'static str,
    date: &'static str,
    time: &'static str,
    mode: &'static str,
    tags: &'static [&'static str],
}

const DEMO_EVENTS: &[DemoEvent] = &[
    DemoEvent { title: "Tech Summit 2025", image: "/images/tech-summit.jpg", location: "São Paulo, SP", date: "2025-11-15", time: "09:00", mode: "offline", tags: &["tech", "conference"] },
    DemoEvent { title: "React Conference Brasil", image: "/images/react-conference.jpg", location: "Rio de Janeiro, RJ", date: "2025-11-20", time: "10:30", mode: "hybrid", tags: &["react", "frontend", "conference"] },
    DemoEvent { title: "Web Development Workshop", image: "/images/web-dev-workshop.jpg", location: "Belo Horizonte, MG", date: "2025-11-25", time: "14:00", mode: "offline", tags: &["web", "frontend", "workshop"] },
    DemoEvent { title: "DevOps Meetup", image: "/images/devops-meetup.jpg", location: "Curitiba, PR", date: "2025-12-01", time: "18:00", mode: "offline", tags: &["devops", "cloud", "meetup"] },
    DemoEvent { title: "AI & Machine Learning Future", image: "/images/ai-future.jpg", location: "Brasília, DF", date: "2025-12-05", time: "13:30", mode: "online", tags: &["ai", "ml"] },
    DemoEvent { title: "Full Stack Development Conference", image: "/images/full-stack.jpg", location: "Recife, PE", date: "2025-12-10", time: "08:00", mode: "hybrid", tags: &["web", "backend", "conference"] },
    DemoEvent { title: "Mobile Development Summit", image: "/images/mobile-dev.jpg", location: "Fortaleza, CE", date: "2025-12-15", time: "15:15", mode: "offline", tags: &["mobile", "conference"] },
    DemoEvent { title: "Cloud Native & Kubernetes", image: "/images/cloud-native.jpg", location: "Salvador, BA", date: "2025-12-20", time: "11:00", mode: "online", tags: &["cloud", "devops", "kubernetes"] },
    DemoEvent { title: "JavaScript Fest Brasil", image: "/images/javascript-fest.jpg", location: "Manaus, AM", date: "2026-01-08", time: "16:45", mode: "offline", tags: &["javascript", "frontend"] },
    DemoEvent { title: "Tech Startup Pitch Day", image: "/images/startup-pitch.jpg", location: "Porto Alegre, RS", date: "2026-01-15", time: "19:30", mode: "offline", tags: &["startup", "tech"] },
];

pub async fn seed(events: &EventRecords) -> Result<usize> {
    // 幂等：已有任意活动则跳过
    if !events.list_events(EventSort::Desc).await?.is_empty() {
        return Ok(0);
    }
    for demo in DEMO_EVENTS {
        events.create_event(demo_fields(demo)).await?;
    }
    tracing::info!(count = DEMO_EVENTS.len(), "demo events seeded");
    Ok(DEMO_EVENTS.len())
}

fn demo_fields(demo: &DemoEvent) -> EventFields {
    EventFields {
        title: Some(demo.title.into()),
        description: Some(format!("{} brings the community together in {}.", demo.title, demo.location)),
        overview: Some(format!("Talks, workshops and networking at {}.", demo.title)),
        image: Some(demo.image.into()),
        venue: Some("Main Hall".into()),
        location: Some(demo.location.into()),
        date: Some(demo.date.into()),
        time: Some(demo.time.into()),
        mode: Some(demo.mode.into()),
        audience: Some("Developers".into()),
        agenda: Some(vec!["Registration".into(), "Keynote".into(), "Networking".into()]),
        organizer: Some("DevEvent Community".into()),
        tags: Some(demo.tags.iter().map(|t| t.to_string()).collect()),
    }
}
