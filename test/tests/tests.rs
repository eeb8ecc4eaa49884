mod em;
